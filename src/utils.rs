use chrono::{DateTime, Local, NaiveDate, Utc};

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// The current day in the server's local zone; day-bucket classification and
/// due-today matching both count days relative to this.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
