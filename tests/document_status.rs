use anyhow::{Context, Result};
use axum::http::StatusCode;
use chrono::{Duration, Local, Utc};
use serde_json::json;
use uuid::Uuid;

mod common;

async fn create_document(
    test: &common::TestApp,
    token: &str,
    name: &str,
    expiration_days_from_now: Option<i64>,
) -> Result<String> {
    let mut payload = json!({ "name": name });
    if let Some(days) = expiration_days_from_now {
        payload["expiration_date"] = json!((Utc::now() + Duration::days(days)).to_rfc3339());
    }

    let (status, body) =
        common::request(&test.app, "POST", "/documents", Some(token), Some(payload)).await?;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    Ok(body
        .get("id")
        .and_then(|v| v.as_str())
        .context("missing id")?
        .to_string())
}

fn badge_for<'a>(docs: &'a [serde_json::Value], id: &str) -> &'a serde_json::Value {
    docs.iter()
        .find(|d| d.get("id").and_then(|v| v.as_str()) == Some(id))
        .and_then(|d| d.get("status"))
        .expect("document with status badge")
}

#[tokio::test]
async fn buckets_and_labels_over_the_api() -> Result<()> {
    let test = common::spawn_app().await?;
    let token = common::mint_token(
        Uuid::new_v4(),
        &["EDITOR"],
        &["documents:read", "documents:create"],
    )?;

    let undated = create_document(&test, &token, "undated", None).await?;
    let expired = create_document(&test, &token, "expired", Some(-3)).await?;
    let danger = create_document(&test, &token, "danger", Some(5)).await?;
    let warning = create_document(&test, &token, "warning", Some(20)).await?;
    let safe = create_document(&test, &token, "safe", Some(90)).await?;

    let (status, body) = common::request(&test.app, "GET", "/documents", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let docs = body.as_array().context("expected array")?.clone();

    let undated_badge = badge_for(&docs, &undated);
    assert_eq!(undated_badge["status"], "safe");
    assert_eq!(undated_badge["text"], "No expiration date");
    assert!(undated_badge["daysRemaining"].is_null());

    let expired_badge = badge_for(&docs, &expired);
    assert_eq!(expired_badge["status"], "expired");
    assert_eq!(expired_badge["text"], "Expired 3 day(s) ago");
    assert_eq!(expired_badge["daysRemaining"], -3);

    let danger_badge = badge_for(&docs, &danger);
    assert_eq!(danger_badge["status"], "danger");
    assert_eq!(danger_badge["text"], "Expires in 5 day(s)");
    assert_eq!(danger_badge["daysRemaining"], 5);
    assert_eq!(danger_badge["color"], "text-orange-600");

    assert_eq!(badge_for(&docs, &warning)["status"], "warning");
    assert_eq!(badge_for(&docs, &safe)["status"], "safe");

    Ok(())
}

#[tokio::test]
async fn custom_thresholds_via_query() -> Result<()> {
    let test = common::spawn_app().await?;
    let token = common::mint_token(
        Uuid::new_v4(),
        &["EDITOR"],
        &["documents:read", "documents:create"],
    )?;

    let id = create_document(&test, &token, "doc", Some(5)).await?;

    // With danger_days=2 the same document drops to the warning bucket.
    let (status, body) = common::request(
        &test.app,
        "GET",
        "/documents?danger_days=2&warning_days=10",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let docs = body.as_array().context("expected array")?.clone();
    assert_eq!(badge_for(&docs, &id)["status"], "warning");

    Ok(())
}

#[tokio::test]
async fn dashboard_summary_counts_buckets() -> Result<()> {
    let test = common::spawn_app().await?;
    let token = common::mint_token(
        Uuid::new_v4(),
        &["EDITOR"],
        &["documents:read", "documents:create"],
    )?;

    create_document(&test, &token, "expired", Some(-1)).await?;
    create_document(&test, &token, "danger", Some(3)).await?;
    create_document(&test, &token, "warning", Some(15)).await?;
    create_document(&test, &token, "safe", Some(60)).await?;
    create_document(&test, &token, "undated", None).await?;

    let (status, body) =
        common::request(&test.app, "GET", "/dashboard/summary", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["total"], 5);
    assert_eq!(body["expired"], 1);
    assert_eq!(body["danger"], 1);
    assert_eq!(body["warning"], 1);
    assert_eq!(body["safe"], 2, "undated documents count as safe");

    Ok(())
}

#[tokio::test]
async fn alerts_due_is_strict_same_day_not_bucketed() -> Result<()> {
    let test = common::spawn_app().await?;
    let token = common::mint_token(
        Uuid::new_v4(),
        &["EDITOR"],
        &["documents:read", "documents:create"],
    )?;

    let today = create_document(&test, &token, "due-today", Some(0)).await?;
    // Inside the danger window but not due today: the mail job must skip it.
    create_document(&test, &token, "due-in-3", Some(3)).await?;
    create_document(&test, &token, "expired-yesterday", Some(-1)).await?;
    create_document(&test, &token, "undated", None).await?;

    let (status, body) = common::request(&test.app, "GET", "/alerts/due", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let due = body.as_array().context("expected array")?;
    assert_eq!(due.len(), 1, "only the exact-day match is due: {body}");
    assert_eq!(due[0].get("id").and_then(|v| v.as_str()), Some(today.as_str()));

    // Explicit date query: three days out returns the other document.
    let target = (Local::now() + Duration::days(3)).date_naive();
    let (status, body) = common::request(
        &test.app,
        "GET",
        &format!("/alerts/due?date={target}"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let due = body.as_array().context("expected array")?;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].get("name").and_then(|v| v.as_str()), Some("due-in-3"));

    Ok(())
}
