use axum::extract::{Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::app::AppState;
use crate::authz::{permissions, require_permission};
use crate::errors::AppResult;
use crate::lifecycle::expires_on;
use crate::models::document::{DbDocument, Document};
use crate::session::AuthSession;
use crate::utils::local_today;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DueQuery {
    /// Day to match, `YYYY-MM-DD`; defaults to today in the server zone.
    pub date: Option<NaiveDate>,
}

/// Documents whose expiration date falls exactly on the requested day.
///
/// This is the endpoint the external alert-mail scheduler polls. It uses the
/// strict same-day policy, deliberately distinct from the warning/danger
/// bucketing the document list shows: a document inside the warning window
/// but not expiring today is not returned here.
#[utoipa::path(
    get,
    path = "/alerts/due",
    tag = "Alerts",
    params(DueQuery),
    responses((status = 200, description = "Documents expiring on the given day", body = [Document])),
    security(("bearerAuth" = []))
)]
pub async fn due_documents(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(query): Query<DueQuery>,
) -> AppResult<Json<Vec<Document>>> {
    require_permission(&auth.principal, &permissions::DOCUMENTS_READ.into())?;

    let day = query.date.unwrap_or_else(local_today);

    let rows = sqlx::query_as::<_, DbDocument>(
        "SELECT id, name, company_id, notes, expiration_date, alert_date, created_at, updated_at, deleted_at \
         FROM documents WHERE deleted_at IS NULL AND expiration_date IS NOT NULL",
    )
    .fetch_all(&state.pool)
    .await?;

    // Day matching is done in the local zone, same as classification; the
    // stored timestamps are UTC so the SQL layer cannot compare days itself.
    let due: Vec<Document> = rows
        .into_iter()
        .filter(|row| {
            expires_on(
                row.expiration_date
                    .map(|dt| dt.with_timezone(&Local).date_naive()),
                day,
            )
        })
        .map(Document::from)
        .collect();

    Ok(Json(due))
}
