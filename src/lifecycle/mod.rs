//! Document lifecycle status
//!
//! Two deliberately separate policies live here:
//! - [`classify_on`] / [`classify`]: the day-difference bucketing used by the
//!   document list and dashboard (safe / warning / danger / expired with
//!   display metadata);
//! - [`expires_on`]: the strict same-day match used to select documents for
//!   the external alert-mail job.
//!
//! They are not merged: the alert job fires only on the exact expiration day,
//! independent of the warning/danger thresholds.

mod classifier;

pub use classifier::{
    classify, classify_on, expires_on, ExpirationStatus, StatusBadge, Thresholds,
};
