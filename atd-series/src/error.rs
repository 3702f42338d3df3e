/// Error types for the demand series pipeline
use chrono::NaiveDateTime;
use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum SeriesError {
    /// Storage returned no rows inside the requested window
    #[error("No ride data available between {start} and {end}")]
    DataUnavailable {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A stored row could not be interpreted
    #[error("Malformed ride row ({row}): {reason}")]
    MalformedRow { row: String, reason: String },

    /// Smoothing window incompatible with the sequence or the polynomial degree
    #[error("Invalid smoothing window {window} (degree {degree}) for a sequence of {len} values")]
    InvalidSmoothingWindow {
        window: usize,
        degree: usize,
        len: usize,
    },

    /// Series points were not strictly increasing in time
    #[error("Series timestamps out of order: {next} does not follow {previous}")]
    OutOfOrder {
        previous: NaiveDateTime,
        next: NaiveDateTime,
    },

    /// Feedback rating or comment outside the accepted bounds
    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),

    /// Failure reported by a storage collaborator, passed through unchanged
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Type alias for Results using SeriesError
pub type Result<T> = std::result::Result<T, SeriesError>;
