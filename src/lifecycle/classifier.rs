use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::local_today;

/// Day-bucket thresholds for the classifier.
///
/// `danger_days <= warning_days` is expected but not enforced; the branch
/// order (expired, danger, warning, safe) decides any overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Thresholds {
    pub warning_days: i64,
    pub danger_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_days: 30,
            danger_days: 7,
        }
    }
}

/// Lifecycle bucket of a document relative to its expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationStatus {
    Safe,
    Warning,
    Danger,
    Expired,
}

impl ExpirationStatus {
    /// Presentation constants are paired 1:1 with the status, never computed.
    pub fn color(self) -> &'static str {
        match self {
            ExpirationStatus::Safe => "text-emerald-600",
            ExpirationStatus::Warning => "text-amber-600",
            ExpirationStatus::Danger => "text-orange-600",
            ExpirationStatus::Expired => "text-red-600",
        }
    }

    pub fn bg_color(self) -> &'static str {
        match self {
            ExpirationStatus::Safe => "bg-emerald-50",
            ExpirationStatus::Warning => "bg-amber-50",
            ExpirationStatus::Danger => "bg-orange-50",
            ExpirationStatus::Expired => "bg-red-50",
        }
    }

    pub fn border_color(self) -> &'static str {
        match self {
            ExpirationStatus::Safe => "border-emerald-200",
            ExpirationStatus::Warning => "border-amber-200",
            ExpirationStatus::Danger => "border-orange-200",
            ExpirationStatus::Expired => "border-red-200",
        }
    }
}

/// Computed display badge for a document. Derived on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusBadge {
    pub status: ExpirationStatus,
    #[schema(value_type = String)]
    pub color: &'static str,
    #[schema(value_type = String)]
    pub bg_color: &'static str,
    #[schema(value_type = String)]
    pub border_color: &'static str,
    pub text: String,
    /// Days until expiration; negative once past, `null` without a deadline.
    pub days_remaining: Option<i64>,
}

impl StatusBadge {
    fn new(status: ExpirationStatus, text: String, days_remaining: Option<i64>) -> Self {
        Self {
            status,
            color: status.color(),
            bg_color: status.bg_color(),
            border_color: status.border_color(),
            text,
            days_remaining,
        }
    }
}

/// Classify an expiration date against an explicit `today`.
///
/// A document without an expiration date is never flagged. Dates are already
/// midnight-normalized (`NaiveDate`), so the difference is a whole-day count;
/// both threshold boundaries are inclusive and day zero (expires today) lands
/// in the danger bucket, not in expired.
///
/// `alert` is carried for forward compatibility with per-document alert dates
/// and does not participate in the threshold math.
pub fn classify_on(
    expiration: Option<NaiveDate>,
    _alert: Option<NaiveDate>,
    today: NaiveDate,
    thresholds: &Thresholds,
) -> StatusBadge {
    let Some(expiration) = expiration else {
        return StatusBadge::new(
            ExpirationStatus::Safe,
            "No expiration date".to_string(),
            None,
        );
    };

    let diff_days = expiration.signed_duration_since(today).num_days();

    if diff_days < 0 {
        StatusBadge::new(
            ExpirationStatus::Expired,
            format!("Expired {} day(s) ago", -diff_days),
            Some(diff_days),
        )
    } else if diff_days <= thresholds.danger_days {
        StatusBadge::new(
            ExpirationStatus::Danger,
            format!("Expires in {diff_days} day(s)"),
            Some(diff_days),
        )
    } else if diff_days <= thresholds.warning_days {
        // Same label template as danger; only the status and colors differ.
        StatusBadge::new(
            ExpirationStatus::Warning,
            format!("Expires in {diff_days} day(s)"),
            Some(diff_days),
        )
    } else {
        StatusBadge::new(
            ExpirationStatus::Safe,
            format!("Valid for {diff_days} more day(s)"),
            Some(diff_days),
        )
    }
}

/// Classify against the current day in the server's local zone, stripping the
/// stored timestamps' time-of-day first so the day count is deterministic.
pub fn classify(
    expiration: Option<DateTime<Utc>>,
    alert: Option<DateTime<Utc>>,
    thresholds: &Thresholds,
) -> StatusBadge {
    let to_local_day = |dt: DateTime<Utc>| dt.with_timezone(&Local).date_naive();
    classify_on(
        expiration.map(to_local_day),
        alert.map(to_local_day),
        local_today(),
        thresholds,
    )
}

/// Alert-job policy: true only when the expiration date falls exactly on
/// `date`. Distinct from the bucketing classifier -- the mail job does not
/// use the warning/danger thresholds.
pub fn expires_on(expiration: Option<NaiveDate>, date: NaiveDate) -> bool {
    expiration == Some(date)
}
