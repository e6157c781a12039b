//! # Date Detection
//!
//! Strings that read as ISO-8601 date-times are surfaced as `Date` tokens and
//! rewritten into one fixed textual form, since dates travel to the engine as
//! text.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// Normalize an ISO-8601 date-time string into the round-trip form
/// `YYYY-MM-DDTHH:MM:SS.fffffff`, suffixed with `Z` when the input carried an
/// offset (the value is converted to UTC first).
///
/// Returns `None` for anything that is not a full date-time.
pub fn normalize_date(text: &str) -> Option<String> {
    if !has_date_time_shape(text) {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        let utc = with_offset.with_timezone(&Utc).naive_utc();
        return Some(format!("{}Z", round_trip(&utc)));
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| round_trip(&naive))
}

/// Cheap prefix check so ordinary strings skip the parsers
fn has_date_time_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 19
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[10] == b'T'
        && bytes[13] == b':'
}

fn round_trip(value: &NaiveDateTime) -> String {
    // 100ns ticks; leap-second nanos (>= 1e9) fold back into the second
    let ticks = (value.nanosecond() % 1_000_000_000) / 100;
    format!("{}.{:07}", value.format("%Y-%m-%dT%H:%M:%S"), ticks)
}
