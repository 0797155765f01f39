use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::events::{Loggable, Severity};
use crate::lifecycle::StatusBadge;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    /// Owning company; plain CRUD record managed by an external system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub alert_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Loggable for Document {
    fn entity_type() -> &'static str {
        "document"
    }
    fn subject_id(&self) -> Uuid {
        self.id
    }
    fn severity(&self) -> Severity {
        Severity::Important
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDocument {
    pub id: Uuid,
    pub name: String,
    pub company_id: Option<String>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub alert_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<DbDocument> for Document {
    fn from(db: DbDocument) -> Self {
        Document {
            id: db.id,
            name: db.name,
            company_id: db.company_id,
            notes: db.notes,
            expiration_date: db.expiration_date,
            alert_date: db.alert_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
            deleted_at: db.deleted_at,
        }
    }
}

/// A document plus its read-time status badge. The badge is recomputed on
/// every read relative to "now" and never persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentWithStatus {
    #[serde(flatten)]
    pub document: Document,
    pub status: StatusBadge,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentCreateRequest {
    #[schema(example = "Fire safety certificate")]
    pub name: String,
    pub company_id: Option<String>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub alert_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentUpdateRequest {
    pub name: Option<String>,
    pub company_id: Option<String>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub alert_date: Option<DateTime<Utc>>,
    /// Set true to clear both dates regardless of the date fields above.
    #[serde(default)]
    pub clear_dates: bool,
}
