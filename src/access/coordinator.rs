use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Plan for reconciling a user's role set. `to_add` and `to_remove` are
/// disjoint; unchanged assignments appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignmentDiff {
    pub to_add: HashSet<Uuid>,
    pub to_remove: HashSet<Uuid>,
}

impl RoleAssignmentDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// `to_add = desired - current`, `to_remove = current - desired`.
/// Order-independent by construction.
pub fn diff_role_assignments(
    current: &HashSet<Uuid>,
    desired: &HashSet<Uuid>,
) -> RoleAssignmentDiff {
    RoleAssignmentDiff {
        to_add: desired.difference(current).copied().collect(),
        to_remove: current.difference(desired).copied().collect(),
    }
}

/// A user's association with a company, with an optional per-company code
/// (e.g. a branch or registration number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyAssignment {
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CompanyAssignment {
    pub fn new(company_id: impl Into<String>, code: Option<String>) -> Self {
        Self {
            company_id: company_id.into(),
            code,
        }
    }
}

/// Plan for reconciling a user's company assignments, keyed by `company_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyAssignmentDiff {
    pub to_add: Vec<CompanyAssignment>,
    pub to_remove: Vec<String>,
    /// Present in both states but with a different `code` (including
    /// transitions to/from no code). Identical entries never land here.
    pub to_update: Vec<CompanyAssignment>,
}

impl CompanyAssignmentDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.to_update.is_empty()
    }
}

/// Diff company assignments by `company_id`.
///
/// Blank/whitespace `company_id` entries in `desired` are dropped before
/// diffing -- they must never surface as a create. `current` comes from our
/// own storage and is taken as-is. Output vectors are sorted by `company_id`
/// so the plan is deterministic regardless of input order.
pub fn diff_company_assignments(
    current: &[CompanyAssignment],
    desired: &[CompanyAssignment],
) -> CompanyAssignmentDiff {
    let current_by_id: HashMap<&str, &CompanyAssignment> = current
        .iter()
        .map(|a| (a.company_id.as_str(), a))
        .collect();
    let desired_by_id: HashMap<&str, &CompanyAssignment> = desired
        .iter()
        .filter(|a| !a.company_id.trim().is_empty())
        .map(|a| (a.company_id.as_str(), a))
        .collect();

    let mut diff = CompanyAssignmentDiff::default();

    for (id, wanted) in &desired_by_id {
        match current_by_id.get(id) {
            None => diff.to_add.push((*wanted).clone()),
            Some(existing) if existing.code != wanted.code => {
                diff.to_update.push((*wanted).clone())
            }
            Some(_) => {}
        }
    }

    for id in current_by_id.keys() {
        if !desired_by_id.contains_key(id) {
            diff.to_remove.push((*id).to_string());
        }
    }

    diff.to_add.sort_by(|a, b| a.company_id.cmp(&b.company_id));
    diff.to_update.sort_by(|a, b| a.company_id.cmp(&b.company_id));
    diff.to_remove.sort();

    diff
}

/// One failed assignment operation out of a best-effort batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplyFailure {
    /// e.g. "role:add", "company:update"
    pub operation: String,
    /// The role id or company id the operation targeted.
    pub key: String,
    pub message: String,
}

/// Outcome of dispatching a diff: every operation ran independently, so a
/// partial result is possible and nothing that succeeded is rolled back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApplyReport {
    pub applied: usize,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_ok(&mut self) {
        self.applied += 1;
    }

    pub fn record_failure(
        &mut self,
        operation: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.failures.push(ApplyFailure {
            operation: operation.into(),
            key: key.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ApplyReport) {
        self.applied += other.applied;
        self.failures.extend(other.failures);
    }
}
