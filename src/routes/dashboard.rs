use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{permissions, require_permission};
use crate::errors::AppResult;
use crate::lifecycle::{classify, ExpirationStatus};
use crate::models::document::DbDocument;
use crate::routes::documents::StatusQuery;
use crate::session::AuthSession;

/// Counts per status bucket over the live (non-deleted) documents.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total: usize,
    pub safe: usize,
    pub warning: usize,
    pub danger: usize,
    pub expired: usize,
}

#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "Dashboard",
    params(StatusQuery),
    responses((status = 200, description = "Document counts per status bucket", body = DashboardSummary)),
    security(("bearerAuth" = []))
)]
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<DashboardSummary>> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_READ.into())?;

    let thresholds = query.thresholds();
    let rows = sqlx::query_as::<_, DbDocument>(
        "SELECT id, name, company_id, notes, expiration_date, alert_date, created_at, updated_at, deleted_at \
         FROM documents WHERE deleted_at IS NULL",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut summary = DashboardSummary {
        total: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let badge = classify(row.expiration_date, row.alert_date, &thresholds);
        match badge.status {
            ExpirationStatus::Safe => summary.safe += 1,
            ExpirationStatus::Warning => summary.warning += 1,
            ExpirationStatus::Danger => summary.danger += 1,
            ExpirationStatus::Expired => summary.expired += 1,
        }
    }

    Ok(Json(summary))
}
