use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub async fn init() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Idempotent schema bootstrap. Companies, templates and users proper are
/// owned by external systems; only the tables this service writes live here.
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            company_id TEXT,
            notes TEXT,
            expiration_date TEXT,
            alert_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )",
        "CREATE TABLE IF NOT EXISTS user_roles (
            user_id TEXT NOT NULL,
            role_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, role_id)
        )",
        "CREATE TABLE IF NOT EXISTS user_companies (
            user_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            code TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, company_id)
        )",
        "CREATE TABLE IF NOT EXISTS activity_log (
            id TEXT PRIMARY KEY,
            event_name TEXT NOT NULL,
            description TEXT NOT NULL,
            actor_id TEXT,
            subject_id TEXT,
            occurred_at TEXT NOT NULL,
            properties TEXT,
            severity TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS event_store (
            id TEXT PRIMARY KEY,
            event_name TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            actor_id TEXT,
            subject_id TEXT,
            payload TEXT NOT NULL,
            severity TEXT NOT NULL,
            prev_hash TEXT,
            hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        "CREATE INDEX IF NOT EXISTS idx_documents_expiration ON documents (expiration_date)",
        "CREATE INDEX IF NOT EXISTS idx_activity_log_occurred ON activity_log (occurred_at)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to initialize schema")?;
    }

    Ok(())
}
