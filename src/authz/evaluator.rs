use super::principal::{PermissionName, Principal, RoleName};

/// Pure permission/role membership checks with the `admin` wildcard bypass.
///
/// Evaluation order for permission checks:
/// 1. `admin` sentinel in the principal's permission set -> allow
/// 2. exact membership of the required permission(s) -> allow
/// 3. deny
///
/// Role checks are exact-match only; the wildcard never applies to them.
/// Every operation is a total function returning `bool` -- denial is a value,
/// not an error, and the caller decides what a `false` becomes (usually 403).
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// True when the principal holds `required` exactly, or holds the
    /// `admin` wildcard. An empty permission set denies everything.
    pub fn has_permission(&self, principal: &Principal, required: &PermissionName) -> bool {
        if principal.is_admin() {
            tracing::debug!(
                user_id = %principal.user_id,
                permission = %required,
                "admin wildcard bypass"
            );
            return true;
        }

        let granted = principal.has_permission(required);
        if !granted {
            tracing::debug!(
                user_id = %principal.user_id,
                permission = %required,
                "permission denied"
            );
        }
        granted
    }

    /// True when at least one of `required` is held (or the wildcard is).
    ///
    /// An empty `required` list denies: asking for "any of nothing" grants
    /// nothing (fail-closed).
    pub fn has_any_permission(&self, principal: &Principal, required: &[PermissionName]) -> bool {
        if principal.is_admin() {
            return true;
        }
        required.iter().any(|p| principal.has_permission(p))
    }

    /// True when every element of `required` is held (or the wildcard is).
    ///
    /// An empty `required` list is vacuously satisfied. The asymmetry with
    /// `has_any_permission` is deliberate: existing call sites pass a fixed
    /// list and rely on the empty case meaning "no constraint".
    pub fn has_all_permissions(&self, principal: &Principal, required: &[PermissionName]) -> bool {
        if principal.is_admin() {
            return true;
        }
        required.iter().all(|p| principal.has_permission(p))
    }

    /// Exact role membership. No wildcard bypass at the role layer.
    pub fn has_role(&self, principal: &Principal, required: &RoleName) -> bool {
        principal.has_role(required)
    }

    /// True when the principal's role set intersects `required`.
    pub fn has_any_role(&self, principal: &Principal, required: &[RoleName]) -> bool {
        required.iter().any(|r| principal.has_role(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn perms(names: &[&str]) -> Vec<PermissionName> {
        names.iter().map(|n| PermissionName::new(*n)).collect()
    }

    #[test]
    fn admin_wildcard_grants_any_permission() {
        let evaluator = PermissionEvaluator::new();
        let principal = Principal::new(Uuid::new_v4()).with_permissions(["admin"]);

        assert!(evaluator.has_permission(&principal, &"documents:read".into()));
        assert!(evaluator.has_permission(&principal, &"never:granted".into()));
        assert!(evaluator.has_any_permission(&principal, &perms(&["x:y"])));
        assert!(evaluator.has_all_permissions(&principal, &perms(&["x:y", "z:w"])));
    }

    #[test]
    fn empty_permission_set_denies() {
        let evaluator = PermissionEvaluator::new();
        let principal = Principal::new(Uuid::new_v4());

        assert!(!evaluator.has_permission(&principal, &"documents:read".into()));
    }

    #[test]
    fn exact_match_required_without_wildcard() {
        let evaluator = PermissionEvaluator::new();
        let principal =
            Principal::new(Uuid::new_v4()).with_permissions(["documents:read"]);

        assert!(evaluator.has_permission(&principal, &"documents:read".into()));
        assert!(!evaluator.has_permission(&principal, &"documents:create".into()));
    }

    #[test]
    fn any_of_empty_denies_all_of_empty_grants() {
        let evaluator = PermissionEvaluator::new();
        let principal =
            Principal::new(Uuid::new_v4()).with_permissions(["documents:read"]);

        assert!(!evaluator.has_any_permission(&principal, &[]));
        assert!(evaluator.has_all_permissions(&principal, &[]));

        // The asymmetry holds even for a principal with nothing at all.
        let nobody = Principal::new(Uuid::new_v4());
        assert!(!evaluator.has_any_permission(&nobody, &[]));
        assert!(evaluator.has_all_permissions(&nobody, &[]));
    }

    #[test]
    fn any_and_all_over_partial_grants() {
        let evaluator = PermissionEvaluator::new();
        let principal =
            Principal::new(Uuid::new_v4()).with_permissions(["documents:read"]);

        assert!(evaluator.has_any_permission(
            &principal,
            &perms(&["documents:read", "documents:create"])
        ));
        assert!(!evaluator.has_all_permissions(
            &principal,
            &perms(&["documents:read", "documents:create"])
        ));
    }

    #[test]
    fn role_checks_ignore_the_admin_wildcard() {
        let evaluator = PermissionEvaluator::new();
        let principal = Principal::new(Uuid::new_v4()).with_permissions(["admin"]);

        assert!(!evaluator.has_role(&principal, &"ADMINISTRADOR".into()));
        assert!(!evaluator.has_any_role(&principal, &["EDITOR".into(), "LEITOR".into()]));
    }

    #[test]
    fn role_intersection() {
        let evaluator = PermissionEvaluator::new();
        let principal = Principal::new(Uuid::new_v4()).with_roles(["LEITOR"]);

        assert!(evaluator.has_role(&principal, &"LEITOR".into()));
        assert!(evaluator.has_any_role(&principal, &["EDITOR".into(), "LEITOR".into()]));
        assert!(!evaluator.has_any_role(&principal, &["EDITOR".into()]));
        assert!(!evaluator.has_any_role(&principal, &[]));
    }

    #[test]
    fn reader_scenario() {
        let evaluator = PermissionEvaluator::new();
        let principal = Principal::new(Uuid::new_v4())
            .with_roles(["LEITOR"])
            .with_permissions(["documents:read"]);

        assert!(!evaluator.has_permission(&principal, &"documents:create".into()));
        assert!(evaluator.has_any_permission(
            &principal,
            &perms(&["documents:read", "documents:create"])
        ));
    }
}
