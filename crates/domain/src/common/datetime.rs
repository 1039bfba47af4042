//! Timestamp helpers for rows stored as RFC3339 text.

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse an RFC3339 timestamp, normalising to UTC.
///
/// ```
/// use waymark_domain::common::parse_datetime;
/// use chrono::Datelike;
///
/// let dt = parse_datetime("2025-03-01T10:30:00Z").unwrap();
/// assert_eq!(dt.month(), 3);
/// ```
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Parse a nullable timestamp column. Empty or malformed text reads as `None`.
pub fn parse_optional_datetime(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.filter(|s| !s.is_empty()).and_then(|s| parse_datetime(s).ok())
}

/// Format a timestamp for storage with fixed millisecond precision, so that
/// stored values sort lexically in time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
