//! Row types returned by the storage queries.

use serde::Serialize;

/// One stored forecast step.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastRow {
    /// Zero-based horizon index; the row at position 0 covers the
    /// reference time.
    pub position: i64,
    /// Time the forecast was produced for, "YYYY-MM-DD HH:MM:SS".
    pub timestamp: String,
    pub value: f64,
}

/// First and last dates present in the rides table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RideDateRange {
    pub first: String,
    pub last: String,
}

/// One stored feedback record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeedbackRow {
    pub id: i64,
    /// Wall-clock time of submission, "YYYY-MM-DD HH:MM:SS".
    pub created_at: String,
    pub rating: Option<u8>,
    pub comment: String,
}
