//! `feedback` command: store one user feedback record.

use crate::settings::Settings;
use atd_db::Database;
use atd_series::model::FeedbackRecord;
use atd_series::source::FeedbackSink;
use chrono::{NaiveDateTime, Utc};

pub fn run_feedback(config: Option<&str>, rating: Option<u8>, comment: &str) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let created_at = settings.zone()?.wall_clock(&Utc::now());
    let db = Database::open(&settings.database)?;
    submit(&db, created_at, rating, comment)
}

/// Validate and append a feedback record stamped `created_at`.
pub fn submit<S: FeedbackSink + ?Sized>(
    sink: &S,
    created_at: NaiveDateTime,
    rating: Option<u8>,
    comment: &str,
) -> anyhow::Result<()> {
    let record = FeedbackRecord::new(created_at, rating, comment)?;
    sink.append_feedback(&record)?;
    log::info!("[ATD] feedback: stored feedback from {}", created_at);
    Ok(())
}
