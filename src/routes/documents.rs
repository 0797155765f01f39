use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{permissions, require_permission};
use crate::errors::{AppError, AppResult};
use crate::events::log_activity;
use crate::lifecycle::{classify, Thresholds};
use crate::models::document::{
    DbDocument, Document, DocumentCreateRequest, DocumentUpdateRequest, DocumentWithStatus,
};
use crate::session::AuthSession;
use crate::utils::utc_now;

/// Optional per-request threshold overrides for the status buckets.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    pub warning_days: Option<i64>,
    pub danger_days: Option<i64>,
}

impl StatusQuery {
    pub fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        Thresholds {
            warning_days: self.warning_days.unwrap_or(defaults.warning_days),
            danger_days: self.danger_days.unwrap_or(defaults.danger_days),
        }
    }
}

fn with_status(document: Document, thresholds: &Thresholds) -> DocumentWithStatus {
    let status = classify(document.expiration_date, document.alert_date, thresholds);
    DocumentWithStatus { document, status }
}

#[utoipa::path(
    get,
    path = "/documents",
    tag = "Documents",
    params(StatusQuery),
    responses((status = 200, description = "List documents with computed status", body = [DocumentWithStatus])),
    security(("bearerAuth" = []))
)]
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<DocumentWithStatus>>> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_READ.into())?;

    let thresholds = query.thresholds();
    let rows = sqlx::query_as::<_, DbDocument>(
        "SELECT id, name, company_id, notes, expiration_date, alert_date, created_at, updated_at, deleted_at \
         FROM documents WHERE deleted_at IS NULL ORDER BY expiration_date IS NULL, expiration_date ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    let documents = rows
        .into_iter()
        .map(|row| with_status(row.into(), &thresholds))
        .collect();

    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses((status = 200, description = "Document detail with computed status", body = DocumentWithStatus)),
    security(("bearerAuth" = []))
)]
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DocumentWithStatus>> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_READ.into())?;

    let document: Document = fetch_document(&state.pool, id).await?.into();
    Ok(Json(with_status(document, &Thresholds::default())))
}

#[utoipa::path(
    post,
    path = "/documents",
    tag = "Documents",
    request_body = DocumentCreateRequest,
    responses((status = 201, description = "Document created", body = Document)),
    security(("bearerAuth" = []))
)]
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(payload): Json<DocumentCreateRequest>,
) -> AppResult<(StatusCode, Json<Document>)> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_CREATE.into())?;

    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("document name must not be empty"));
    }

    let now = utc_now();
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO documents (id, name, company_id, notes, expiration_date, alert_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(payload.name.trim())
    .bind(&payload.company_id)
    .bind(&payload.notes)
    .bind(payload.expiration_date)
    .bind(payload.alert_date)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let document: Document = fetch_document(&state.pool, id).await?.into();
    log_activity(&state.event_bus, "created", Some(auth.user_id()), &document, None);

    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    put,
    path = "/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = DocumentUpdateRequest,
    responses((status = 200, description = "Document updated", body = Document)),
    security(("bearerAuth" = []))
)]
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<DocumentUpdateRequest>,
) -> AppResult<Json<Document>> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_UPDATE.into())?;

    let before: Document = fetch_document(&state.pool, id).await?.into();
    let mut document = before.clone();

    if let Some(name) = payload.name.as_ref() {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("document name must not be empty"));
        }
        document.name = name.trim().to_string();
    }
    if payload.company_id.is_some() {
        document.company_id = payload.company_id.clone();
    }
    if payload.notes.is_some() {
        document.notes = payload.notes.clone();
    }
    if payload.clear_dates {
        document.expiration_date = None;
        document.alert_date = None;
    } else {
        if payload.expiration_date.is_some() {
            document.expiration_date = payload.expiration_date;
        }
        if payload.alert_date.is_some() {
            document.alert_date = payload.alert_date;
        }
    }

    let now = utc_now();

    sqlx::query(
        "UPDATE documents SET name = ?, company_id = ?, notes = ?, expiration_date = ?, alert_date = ?, updated_at = ? \
         WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&document.name)
    .bind(&document.company_id)
    .bind(&document.notes)
    .bind(document.expiration_date)
    .bind(document.alert_date)
    .bind(now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    document.updated_at = now;
    log_activity(
        &state.event_bus,
        "updated",
        Some(auth.user_id()),
        &document,
        Some(&before),
    );

    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses((status = 204, description = "Document soft deleted")),
    security(("bearerAuth" = []))
)]
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_DELETE.into())?;

    let document: Document = fetch_document(&state.pool, id).await?.into();

    let now = utc_now();
    let affected =
        sqlx::query("UPDATE documents SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&state.pool)
            .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("document not found"));
    }

    log_activity(&state.event_bus, "deleted", Some(auth.user_id()), &document, None);

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_document(pool: &SqlitePool, id: Uuid) -> AppResult<DbDocument> {
    sqlx::query_as::<_, DbDocument>(
        "SELECT id, name, company_id, notes, expiration_date, alert_date, created_at, updated_at, deleted_at \
         FROM documents WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("document not found"))
}
