//! Timestamp parsing
//!
//! News times arrive in several shapes. Layouts are tried in order and the
//! first match wins; anything else is "unparsable" and sorts first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

enum Layout {
    DateTime(&'static str),
    Date(&'static str),
}

const LAYOUTS: &[Layout] = &[
    Layout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%dT%H:%M"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%d %H:%M"),
    Layout::Date("%Y-%m-%d"),
    Layout::DateTime("%Y/%m/%d %H:%M:%S"),
    Layout::DateTime("%Y/%m/%d %H:%M"),
    Layout::Date("%Y/%m/%d"),
];

/// Parse a news timestamp. Offsets are normalised to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    LAYOUTS.iter().find_map(|layout| match layout {
        Layout::DateTime(fmt) => NaiveDateTime::parse_from_str(raw, fmt).ok(),
        Layout::Date(fmt) => NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
    })
}

/// Calendar date of a timestamp, if parsable
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// Sort key: unparsable (`None`) orders before every real time
pub fn sort_key(raw: &str) -> Option<NaiveDateTime> {
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!("Unparsable news time {:?}, ordering it first", raw);
    }
    parsed
}
