//! Wall-clock timestamp helpers for record metadata.
//!
//! Timestamps are persisted as plain `"%Y-%m-%d %H:%M:%S"` strings; the
//! database never sees a native datetime type.

use chrono::{Local, NaiveDateTime};

/// Storage format for `date` and `modified` columns.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DISPLAY_FORMAT: &str = "%b %-d, %Y %H:%M";

/// Current local time in storage format.
pub fn now_stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// Parses a stored timestamp; `None` when the value is not in storage
/// format.
pub fn parse_stamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, STAMP_FORMAT).ok()
}

/// Re-formats a stored timestamp for display (abbreviated month, no
/// seconds).
///
/// Degrades to an empty string when the stored value cannot be parsed;
/// display formatting is never a hard failure.
pub fn format_display(value: &str) -> String {
    match parse_stamp(value) {
        Some(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_display, now_stamp, parse_stamp};

    #[test]
    fn now_stamp_roundtrips_through_parse() {
        let stamp = now_stamp();
        assert!(parse_stamp(&stamp).is_some(), "unparseable stamp {stamp}");
    }

    #[test]
    fn parse_stamp_rejects_garbage() {
        assert!(parse_stamp("not a timestamp").is_none());
        assert!(parse_stamp("2024-13-40 99:99:99").is_none());
    }

    #[test]
    fn format_display_abbreviates_month() {
        assert_eq!(format_display("2024-03-07 09:30:00"), "Mar 7, 2024 09:30");
    }

    #[test]
    fn format_display_degrades_to_empty_on_parse_failure() {
        assert_eq!(format_display("garbage"), "");
    }
}
