//! Authorization module
//!
//! Membership-based permission evaluation over an explicit [`Principal`]:
//! - flattened role and permission sets handed over by the session layer
//! - `admin` wildcard bypass at the permission layer only
//! - fail-closed defaults (absent collections are empty sets)
//!
//! Everything here is pure and synchronous; denial is a `bool`, and turning
//! it into an HTTP 403 happens once, in the route handler, via
//! [`require_permission`].

mod evaluator;
mod principal;

pub use evaluator::PermissionEvaluator;
pub use principal::{PermissionName, Principal, RoleName};

use crate::errors::AppError;

/// Route-layer gate: convert a denied permission check into a 403.
///
/// This is the single enforcement point -- lower layers (the assignment
/// coordinator in particular) never re-check.
pub fn require_permission(principal: &Principal, required: &PermissionName) -> Result<(), AppError> {
    if PermissionEvaluator::new().has_permission(principal, required) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "missing permission: {required}"
        )))
    }
}

/// Well-known role names
pub mod roles {
    pub const ADMINISTRADOR: &str = "ADMINISTRADOR";
    pub const EDITOR: &str = "EDITOR";
    pub const LEITOR: &str = "LEITOR";
}

/// Well-known permission names
pub mod permissions {
    /// Wildcard sentinel: grants every permission check.
    pub const ADMIN: &str = "admin";

    // Documents
    pub const DOCUMENTS_READ: &str = "documents:read";
    pub const DOCUMENTS_CREATE: &str = "documents:create";
    pub const DOCUMENTS_UPDATE: &str = "documents:update";
    pub const DOCUMENTS_DELETE: &str = "documents:delete";

    // Role/company assignment management
    pub const ACCESSES_MANAGE: &str = "accesses:manage";

    // Companies & templates (plain CRUD records, managed elsewhere)
    pub const COMPANIES_MANAGE: &str = "companies:manage";
    pub const TEMPLATES_MANAGE: &str = "templates:manage";
}
