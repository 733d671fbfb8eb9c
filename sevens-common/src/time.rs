//! Timestamp utilities

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp `days` days from now
pub fn days_from_now(days: i64) -> DateTime<Utc> {
    now() + Duration::days(days)
}

/// Render a timestamp the way cookie `expires=` attributes carry it
pub fn to_cookie_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc2822()
}

/// Parse a cookie `expires=` attribute back into UTC
pub fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a stored log timestamp
///
/// Accepts RFC 3339 (`2024-08-05T10:00:00.000Z`) and bare dates, which read as
/// midnight UTC. Anything else is `None`.
pub fn parse_log_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
