//! Access assignment coordination
//!
//! Replacing a user's role and company assignments is a stateless
//! diff-then-dispatch: compute the plan from the current and desired state
//! ([`diff_role_assignments`], [`diff_company_assignments`]), then issue each
//! planned operation as an independent, idempotent upsert or delete
//! ([`apply_role_diff`], [`apply_company_diff`]).
//!
//! There is no batch transaction: a failed operation is recorded in the
//! [`ApplyReport`] and the rest still run. The `accesses:manage` gate is
//! enforced once, in the route handler, never here.

mod coordinator;
mod store;

pub use coordinator::{
    diff_company_assignments, diff_role_assignments, ApplyFailure, ApplyReport,
    CompanyAssignment, CompanyAssignmentDiff, RoleAssignmentDiff,
};
pub use store::{apply_company_diff, apply_role_diff, AccessStore, SqliteAccessStore};
