use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::access::{
    apply_company_diff, apply_role_diff, diff_company_assignments, diff_role_assignments,
    ApplyReport, CompanyAssignment, SqliteAccessStore,
};
use crate::app::AppState;
use crate::authz::{permissions, require_permission};
use crate::errors::AppResult;
use crate::events::log_activity;
use crate::models::access::{AccessUpdateRequest, AccessView};
use crate::session::AuthSession;

#[utoipa::path(
    get,
    path = "/users/{user_id}/accesses",
    tag = "Accesses",
    params(("user_id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Current role and company assignments", body = AccessView)),
    security(("bearerAuth" = []))
)]
pub async fn get_accesses(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<AccessView>> {
    require_permission(&auth.principal, &permissions::ACCESSES_MANAGE.into())?;

    let view = load_access_view(&state.pool, user_id).await?;
    Ok(Json(view))
}

/// Replace a user's assignments with the desired full state.
///
/// The `accesses:manage` gate is checked here, once; the diff and dispatch
/// below never re-check. Each planned operation runs independently, so a
/// single failure yields a partial result (207) rather than a rollback.
#[utoipa::path(
    put,
    path = "/users/{user_id}/accesses",
    tag = "Accesses",
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = AccessUpdateRequest,
    responses(
        (status = 200, description = "All assignment operations applied", body = ApplyReport),
        (status = 207, description = "Some assignment operations failed", body = ApplyReport),
    ),
    security(("bearerAuth" = []))
)]
pub async fn replace_accesses(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AccessUpdateRequest>,
) -> AppResult<(StatusCode, Json<ApplyReport>)> {
    require_permission(&auth.principal, &permissions::ACCESSES_MANAGE.into())?;

    let current = load_access_view(&state.pool, user_id).await?;

    let current_roles: HashSet<Uuid> = current.role_ids.iter().copied().collect();
    let desired_roles: HashSet<Uuid> = payload.role_ids.iter().copied().collect();
    let role_diff = diff_role_assignments(&current_roles, &desired_roles);
    let company_diff = diff_company_assignments(&current.companies, &payload.companies);

    let store = SqliteAccessStore::new(state.pool.clone());
    let mut report = apply_role_diff(&store, user_id, &role_diff).await;
    report.merge(apply_company_diff(&store, user_id, &company_diff).await);

    let after = load_access_view(&state.pool, user_id).await?;
    log_activity(
        &state.event_bus,
        "replaced",
        Some(auth.user_id()),
        &after,
        Some(&current),
    );

    let status = if report.is_clean() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(report)))
}

async fn load_access_view(pool: &SqlitePool, user_id: Uuid) -> AppResult<AccessView> {
    let role_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = ? ORDER BY role_id")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let companies = sqlx::query(
        "SELECT company_id, code FROM user_companies WHERE user_id = ? ORDER BY company_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| CompanyAssignment {
        company_id: row.get("company_id"),
        code: row.get("code"),
    })
    .collect();

    Ok(AccessView {
        user_id,
        role_ids,
        companies,
    })
}
