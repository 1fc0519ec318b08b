use chrono::{DateTime, NaiveDateTime};

/// Number of identifier characters shown before the ellipsis.
const SHORT_ID_LEN: usize = 8;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Abbreviate an opaque identifier to its first few characters.
pub fn short_id(id: &str) -> String {
    if id.chars().count() <= SHORT_ID_LEN {
        id.to_string()
    } else {
        let prefix: String = id.chars().take(SHORT_ID_LEN).collect();
        format!("{}...", prefix)
    }
}

/// Format a timestamp as a calendar date.
///
/// The backend sends naive ISO timestamps (no offset), but RFC 3339 is
/// accepted as well. Anything else is cut to its first ten characters.
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        dt.format("%Y-%m-%d").to_string()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.format("%Y-%m-%d").to_string()
    } else if date.chars().count() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}
