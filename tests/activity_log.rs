use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

mod common;

async fn wait_for_logs(
    pool: &sqlx::SqlitePool,
    event_name: &str,
    expected: usize,
) -> Result<Vec<(String, String, String)>> {
    // The listener is async; poll briefly.
    for _ in 0..25 {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT event_name, description, severity FROM activity_log WHERE event_name = ?",
        )
        .bind(event_name)
        .fetch_all(pool)
        .await?;

        if rows.len() >= expected {
            return Ok(rows);
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    }
    Ok(Vec::new())
}

#[tokio::test]
async fn document_mutations_are_audited() -> Result<()> {
    let test = common::spawn_app().await?;
    let editor = common::mint_token(Uuid::new_v4(), &[], &["documents:create"])?;

    let (status, _) = common::request(
        &test.app,
        "POST",
        "/documents",
        Some(&editor),
        Some(json!({ "name": "Audited document" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let logs = wait_for_logs(&test.pool, "document.created", 1).await?;
    assert!(!logs.is_empty(), "activity log should contain document.created");
    assert_eq!(logs[0].1, "Document created");
    assert_eq!(logs[0].2, "important");

    Ok(())
}

#[tokio::test]
async fn access_changes_are_critical_and_hash_chained() -> Result<()> {
    let test = common::spawn_app().await?;
    let manager = common::mint_token(Uuid::new_v4(), &[], &["accesses:manage"])?;
    let subject = Uuid::new_v4();

    for companies in [
        json!([{ "company_id": "COMP-1", "code": "A" }]),
        json!([{ "company_id": "COMP-1", "code": "B" }]),
    ] {
        let (status, _) = common::request(
            &test.app,
            "PUT",
            &format!("/users/{subject}/accesses"),
            Some(&manager),
            Some(json!({ "role_ids": [], "companies": companies })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let logs = wait_for_logs(&test.pool, "access.replaced", 2).await?;
    assert_eq!(logs.len(), 2, "both replacements must be audited");
    assert!(logs.iter().all(|l| l.2 == "critical"));

    // Verify the event_store hash chain end to end.
    let rows: Vec<(Option<String>, String, String)> =
        sqlx::query_as("SELECT prev_hash, hash, payload FROM event_store ORDER BY created_at ASC")
            .fetch_all(&test.pool)
            .await?;
    assert!(rows.len() >= 2);

    let mut prev: Option<String> = None;
    for (prev_hash, hash, payload) in rows {
        assert_eq!(prev_hash, prev, "chain link must reference previous hash");

        let mut hasher = Sha256::new();
        if let Some(ref ph) = prev_hash {
            hasher.update(ph.as_bytes());
        }
        hasher.update(payload.as_bytes());
        assert_eq!(hash, hex::encode(hasher.finalize()));

        prev = Some(hash);
    }

    Ok(())
}
