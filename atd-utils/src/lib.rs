//! Shared date and time helpers for the taxi demand crates.

/// Date and time utility functions
pub mod dates {
    use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

    /// Date format of the rides table: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Time-of-day format of the rides table: "HH:MM:SS"
    pub const TIME_FORMAT: &str = "%H:%M:%S";

    /// Timestamp format used for forecast rows and feedback records
    pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Format a NaiveDateTime as "YYYY-MM-DD HH:MM:SS"
    pub fn format_date_time(date_time: &NaiveDateTime) -> String {
        date_time.format(DATE_TIME_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Parse a time of day in "HH:MM:SS" or "HH:MM" format
    pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map_err(|e| anyhow::anyhow!("invalid time '{}': {}", s, e))
    }

    /// Parse a timestamp in "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DD HH:MM"
    /// or ISO "YYYY-MM-DDTHH:MM:SS" format
    pub fn parse_date_time(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .ok_or_else(|| anyhow::anyhow!("invalid timestamp '{}'", s))
    }

    /// Floor a timestamp to the start of its `step_minutes` bucket.
    ///
    /// Buckets are aligned to midnight, so a 15 minute step yields
    /// :00, :15, :30 and :45. Seconds and sub-seconds are dropped.
    /// A zero step leaves the timestamp unchanged.
    pub fn floor_to_step(date_time: NaiveDateTime, step_minutes: u32) -> NaiveDateTime {
        if step_minutes == 0 {
            return date_time;
        }
        let secs = i64::from(date_time.time().num_seconds_from_midnight());
        let step_secs = i64::from(step_minutes) * 60;
        let floored = secs - secs.rem_euclid(step_secs);
        date_time.date().and_time(NaiveTime::MIN) + TimeDelta::seconds(floored)
    }

    /// "HH:MM" label for an axis tick or the clock caption
    pub fn format_clock(date_time: &NaiveDateTime) -> String {
        date_time.format("%H:%M").to_string()
    }

    /// Short "day.month" label without zero padding, e.g. "5.6" for June 5
    pub fn format_day_month(date_time: &NaiveDateTime) -> String {
        format!("{}.{}", date_time.day(), date_time.month())
    }

}
