//! Seams to the storage collaborators.
//!
//! The pipeline only needs read access to ride rows and forecast values
//! and an append-only sink for feedback. Implementations report failures
//! as `anyhow::Error`; the pipeline passes them through as
//! [`SeriesError::Storage`](crate::error::SeriesError::Storage).

use crate::model::{FeedbackRecord, RawRideRow};
use chrono::NaiveDate;

/// Read access to the rides table.
pub trait RideSource {
    /// Rows dated on or after `since`. Extra older or newer rows are
    /// tolerated; the loader filters them itself.
    fn fetch_rides(&self, since: NaiveDate) -> anyhow::Result<Vec<RawRideRow>>;
}

/// Read access to the precomputed forecast, in horizon order.
pub trait ForecastSource {
    fn fetch_forecast(&self) -> anyhow::Result<Vec<f64>>;
}

/// Append-only feedback storage.
pub trait FeedbackSink {
    fn append_feedback(&self, record: &FeedbackRecord) -> anyhow::Result<()>;
}
