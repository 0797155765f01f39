use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::CompanyAssignment;
use crate::events::{Loggable, Severity};

/// A user's current assignments as stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessView {
    pub user_id: Uuid,
    pub role_ids: Vec<Uuid>,
    pub companies: Vec<CompanyAssignment>,
}

impl Loggable for AccessView {
    fn entity_type() -> &'static str {
        "access"
    }
    fn subject_id(&self) -> Uuid {
        self.user_id
    }
    fn severity(&self) -> Severity {
        Severity::Critical
    }
}

/// Desired full state for a user's assignments; the handler diffs this
/// against storage and applies only the delta.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AccessUpdateRequest {
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    #[serde(default)]
    pub companies: Vec<CompanyAssignment>,
}
