use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use sim_backend::session::JwtConfig;

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    // Holds the sqlite file alive for the duration of the test.
    _dir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");

    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    sim_backend::db::init_schema(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = sim_backend::create_app(pool.clone()).await?;

    Ok(TestApp {
        app,
        pool,
        _dir: dir,
    })
}

pub fn mint_token(user_id: Uuid, roles: &[&str], permissions: &[&str]) -> Result<String> {
    std::env::set_var("JWT_SECRET", "test-secret");
    let jwt = JwtConfig::from_env()?;
    Ok(jwt.encode(
        user_id,
        roles.iter().map(|s| s.to_string()).collect(),
        permissions.iter().map(|s| s.to_string()).collect(),
    )?)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    json_body: Option<serde_json::Value>,
) -> Result<(axum::http::StatusCode, serde_json::Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let req = match json_body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp: Response = app.clone().oneshot(req).await?;
    let status = resp.status();
    let body_bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes)?
    };

    Ok((status, value))
}
