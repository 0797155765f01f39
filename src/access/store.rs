use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::coordinator::{ApplyReport, CompanyAssignment, CompanyAssignmentDiff, RoleAssignmentDiff};
use crate::errors::AppError;
use crate::utils::utc_now;

/// Persistence seam for assignment operations. Every method is idempotent so
/// a retried or replayed operation converges instead of erroring.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn upsert_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError>;
    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError>;
    async fn upsert_company(
        &self,
        user_id: Uuid,
        assignment: &CompanyAssignment,
    ) -> Result<(), AppError>;
    async fn update_company(
        &self,
        user_id: Uuid,
        assignment: &CompanyAssignment,
    ) -> Result<(), AppError>;
    async fn remove_company(&self, user_id: Uuid, company_id: &str) -> Result<(), AppError>;
}

/// sqlx-backed store over the `user_roles` / `user_companies` tables.
#[derive(Debug, Clone)]
pub struct SqliteAccessStore {
    pool: SqlitePool,
}

impl SqliteAccessStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessStore for SqliteAccessStore {
    async fn upsert_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(utc_now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_company(
        &self,
        user_id: Uuid,
        assignment: &CompanyAssignment,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_companies (user_id, company_id, code, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (user_id, company_id) DO UPDATE SET code = excluded.code, updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(&assignment.company_id)
        .bind(&assignment.code)
        .bind(utc_now())
        .bind(utc_now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_company(
        &self,
        user_id: Uuid,
        assignment: &CompanyAssignment,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE user_companies SET code = ?, updated_at = ? WHERE user_id = ? AND company_id = ?",
        )
        .bind(&assignment.code)
        .bind(utc_now())
        .bind(user_id)
        .bind(&assignment.company_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_company(&self, user_id: Uuid, company_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_companies WHERE user_id = ? AND company_id = ?")
            .bind(user_id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Dispatch a role diff. Each operation targets a disjoint (user, role) key
/// and runs independently: a failure is recorded and the remaining
/// operations still execute. Nothing is rolled back and no ordering between
/// adds and removes is guaranteed.
pub async fn apply_role_diff(
    store: &dyn AccessStore,
    user_id: Uuid,
    diff: &RoleAssignmentDiff,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for role_id in &diff.to_add {
        match store.upsert_role(user_id, *role_id).await {
            Ok(()) => report.record_ok(),
            Err(err) => report.record_failure("role:add", role_id.to_string(), err.to_string()),
        }
    }

    for role_id in &diff.to_remove {
        match store.remove_role(user_id, *role_id).await {
            Ok(()) => report.record_ok(),
            Err(err) => report.record_failure("role:remove", role_id.to_string(), err.to_string()),
        }
    }

    report
}

/// Dispatch a company diff with the same best-effort, per-key independence
/// as [`apply_role_diff`].
pub async fn apply_company_diff(
    store: &dyn AccessStore,
    user_id: Uuid,
    diff: &CompanyAssignmentDiff,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for assignment in &diff.to_add {
        match store.upsert_company(user_id, assignment).await {
            Ok(()) => report.record_ok(),
            Err(err) => {
                report.record_failure("company:add", assignment.company_id.clone(), err.to_string())
            }
        }
    }

    for assignment in &diff.to_update {
        match store.update_company(user_id, assignment).await {
            Ok(()) => report.record_ok(),
            Err(err) => report.record_failure(
                "company:update",
                assignment.company_id.clone(),
                err.to_string(),
            ),
        }
    }

    for company_id in &diff.to_remove {
        match store.remove_company(user_id, company_id).await {
            Ok(()) => report.record_ok(),
            Err(err) => {
                report.record_failure("company:remove", company_id.clone(), err.to_string())
            }
        }
    }

    report
}
