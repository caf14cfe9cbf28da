//! Shared utility functions for WX crates.

/// Date and clock formatting helpers
pub mod dates {
    use crate::error::DateError;
    use chrono::{DateTime, NaiveDate, TimeZone};

    /// Day key format used for bucket keys and the `--date` argument: "YYYY-MM-DD"
    pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_day_key(date: &NaiveDate) -> String {
        date.format(DAY_KEY_FORMAT).to_string()
    }

    /// Parse a day key in "YYYY-MM-DD" format
    pub fn parse_day_key(s: &str) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(s.trim(), DAY_KEY_FORMAT)
            .map_err(|e| DateError(format!("{s:?} is not a YYYY-MM-DD date ({e})")))
    }

    /// Short 12-hour clock label, e.g. "3 pm" or "12 am".
    pub fn format_clock_hour<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        instant.format("%-I %P").to_string()
    }

    /// 24-hour "HH:MM" label used in rain reports.
    pub fn format_hh_mm<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        instant.format("%H:%M").to_string()
    }

    /// Short day label for summary rows, e.g. "Wed, 1 May".
    pub fn format_day_label(date: &NaiveDate) -> String {
        date.format("%a, %-d %b").to_string()
    }

}

/// Rounding helpers shared by the aggregation and interpolation code
pub mod rounding {
    /// Round to the nearest integer, with halves going towards positive
    /// infinity (-2.5 -> -2, 2.5 -> 3).
    pub fn round_half_up(value: f64) -> i64 {
        (value + 0.5).floor() as i64
    }

    /// Round to one decimal place.
    pub fn round_to_tenth(value: f64) -> f64 {
        (value * 10.0).round() / 10.0
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
