use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permissions::ADMIN;

/// A role identifier, e.g. `ADMINISTRADOR` or `LEITOR`.
///
/// Kept as a plain string on the wire (`#[serde(transparent)]`) but as a
/// distinct Rust type so a role can never be passed where a permission is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A permission identifier, conventionally `<resource>:<action>`
/// (e.g. `documents:read`), or the `admin` wildcard sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(String);

impl PermissionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The acting identity: the authenticated user plus the flattened role and
/// permission sets handed over by the session layer.
///
/// Role-to-permission expansion happens upstream; by the time a `Principal`
/// exists the permission set is already flat. Constructed fresh per request
/// and never persisted here.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub roles: HashSet<RoleName>,
    pub permissions: HashSet<PermissionName>,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            roles: HashSet::new(),
            permissions: HashSet::new(),
        }
    }

    /// Build a principal from raw session claims. Absent collections decode
    /// to empty sets, never to "all access" (fail-closed).
    pub fn from_claims(
        user_id: Uuid,
        roles: Option<Vec<String>>,
        permissions: Option<Vec<String>>,
    ) -> Self {
        Self {
            user_id,
            roles: roles
                .unwrap_or_default()
                .into_iter()
                .map(RoleName::new)
                .collect(),
            permissions: permissions
                .unwrap_or_default()
                .into_iter()
                .map(PermissionName::new)
                .collect(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(RoleName::new).collect();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(PermissionName::new).collect();
        self
    }

    pub fn has_role(&self, role: &RoleName) -> bool {
        self.roles.contains(role)
    }

    pub fn has_permission(&self, permission: &PermissionName) -> bool {
        self.permissions.contains(permission)
    }

    /// The `admin` sentinel lives in the permission set, not the role set.
    pub fn is_admin(&self) -> bool {
        self.permissions.contains(&PermissionName::new(ADMIN))
    }
}
