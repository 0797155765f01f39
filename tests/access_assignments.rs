use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

mod common;

#[tokio::test]
async fn replace_assignments_end_to_end() -> Result<()> {
    let test = common::spawn_app().await?;
    let manager = common::mint_token(Uuid::new_v4(), &[], &["accesses:manage"])?;
    let subject = Uuid::new_v4();

    let role_a = Uuid::new_v4();
    let role_b = Uuid::new_v4();

    // First save: two roles, one company with a code.
    let (status, report) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        Some(json!({
            "role_ids": [role_a, role_b],
            "companies": [{ "company_id": "COMP-1", "code": "X" }]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "apply failed: {report}");
    assert_eq!(report["applied"], 3);
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);

    let (status, view) = common::request(
        &test.app,
        "GET",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["role_ids"].as_array().unwrap().len(), 2);
    assert_eq!(view["companies"], json!([{ "company_id": "COMP-1", "code": "X" }]));

    // Second save: drop role_a, keep role_b, change the company code, add a
    // company. Only the delta is dispatched.
    let (status, report) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        Some(json!({
            "role_ids": [role_b],
            "companies": [
                { "company_id": "COMP-1", "code": "Y" },
                { "company_id": "COMP-2" }
            ]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    // remove role_a + update COMP-1 + add COMP-2
    assert_eq!(report["applied"], 3);

    let (_, view) = common::request(
        &test.app,
        "GET",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        None,
    )
    .await?;
    assert_eq!(view["role_ids"], json!([role_b]));
    let companies = view["companies"].as_array().context("companies")?;
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0], json!({ "company_id": "COMP-1", "code": "Y" }));
    assert_eq!(companies[1], json!({ "company_id": "COMP-2" }));

    Ok(())
}

#[tokio::test]
async fn identical_state_dispatches_nothing() -> Result<()> {
    let test = common::spawn_app().await?;
    let manager = common::mint_token(Uuid::new_v4(), &[], &["accesses:manage"])?;
    let subject = Uuid::new_v4();
    let role = Uuid::new_v4();

    let desired = json!({
        "role_ids": [role],
        "companies": [{ "company_id": "COMP-1", "code": "X" }]
    });

    let (status, _) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        Some(desired.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Saving the same state again is a no-op plan.
    let (status, report) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        Some(desired),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["applied"], 0);
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn blank_company_ids_never_become_creates() -> Result<()> {
    let test = common::spawn_app().await?;
    let manager = common::mint_token(Uuid::new_v4(), &[], &["accesses:manage"])?;
    let subject = Uuid::new_v4();

    let (status, report) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        Some(json!({
            "role_ids": [],
            "companies": [
                { "company_id": "" },
                { "company_id": "   ", "code": "X" },
                { "company_id": "COMP-1" }
            ]
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["applied"], 1, "only the valid company is created");

    let (_, view) = common::request(
        &test.app,
        "GET",
        &format!("/users/{subject}/accesses"),
        Some(&manager),
        None,
    )
    .await?;
    assert_eq!(view["companies"].as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn accesses_require_the_manage_permission() -> Result<()> {
    let test = common::spawn_app().await?;
    // Even a user with full document rights cannot touch assignments.
    let editor = common::mint_token(
        Uuid::new_v4(),
        &["EDITOR"],
        &["documents:read", "documents:create", "documents:update", "documents:delete"],
    )?;
    let subject = Uuid::new_v4();

    let (status, _) = common::request(
        &test.app,
        "GET",
        &format!("/users/{subject}/accesses"),
        Some(&editor),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::request(
        &test.app,
        "PUT",
        &format!("/users/{subject}/accesses"),
        Some(&editor),
        Some(json!({ "role_ids": [], "companies": [] })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}
