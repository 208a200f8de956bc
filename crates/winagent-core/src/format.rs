//! Formatting utilities

use chrono::{DateTime, Local, Utc};

/// Local ISO-8601 timestamp with microseconds, no offset (e.g. `2024-05-01T10:20:30.123456`)
pub fn timestamp() -> String {
    local_iso(Local::now())
}

/// UTC ISO-8601 timestamp with a `Z` suffix, used for log lines
pub fn utc_timestamp() -> String {
    utc_iso(Utc::now())
}

pub fn local_iso(dt: DateTime<Local>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn utc_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to max characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
