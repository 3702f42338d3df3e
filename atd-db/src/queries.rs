//! Typed queries and the pipeline storage seams.
//!
//! Ride rows are returned as unparsed [`RawRideRow`]s; interpreting them is
//! the series loader's job, so a damaged row surfaces there as a
//! malformed-row error instead of being silently dropped here.

use crate::models::{FeedbackRow, ForecastRow, RideDateRange};
use crate::Database;
use atd_series::model::{FeedbackRecord, RawRideRow};
use atd_series::source::{FeedbackSink, ForecastSource, RideSource};
use atd_utils::dates::{format_date, format_date_time};
use chrono::NaiveDate;
use rusqlite::params;

impl Database {
    // ───────────────────── Ride Queries ─────────────────────

    /// Get all ride rows dated on or after `since` ("YYYY-MM-DD"),
    /// ordered by date and time.
    pub fn query_rides_since(&self, since: &str) -> anyhow::Result<Vec<RawRideRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT date, time, category_1, category_2, category_3, category_4
             FROM rides
             WHERE date >= ?1
             ORDER BY date, time",
        )?;
        let rows = stmt
            .query_map(params![since], |row| {
                Ok(RawRideRow {
                    date: row.get(0)?,
                    time: row.get(1)?,
                    counts: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?],
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[ATD] query: query_rides_since({}) returned {} records",
            since,
            rows.len()
        );
        Ok(rows)
    }

    /// Get the first and last ride dates, or `None` for an empty table.
    pub fn query_ride_date_range(&self) -> anyhow::Result<Option<RideDateRange>> {
        let conn = self.conn.borrow();
        let (first, last): (Option<String>, Option<String>) =
            conn.query_row("SELECT MIN(date), MAX(date) FROM rides", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
        let range = first
            .zip(last)
            .map(|(first, last)| RideDateRange { first, last });
        log::info!("[ATD] query: query_ride_date_range returned {:?}", range);
        Ok(range)
    }

    // ───────────────────── Forecast Queries ─────────────────────

    /// Get the stored forecast in horizon order.
    pub fn query_forecast(&self) -> anyhow::Result<Vec<ForecastRow>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT position, timestamp, value FROM forecast ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ForecastRow {
                    position: row.get(0)?,
                    timestamp: row.get(1)?,
                    value: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[ATD] query: query_forecast returned {} records", rows.len());
        Ok(rows)
    }

    /// Get only the forecast values, in horizon order.
    pub fn query_forecast_values(&self) -> anyhow::Result<Vec<f64>> {
        Ok(self.query_forecast()?.into_iter().map(|r| r.value).collect())
    }

    // ───────────────────── Feedback ─────────────────────

    /// Append one feedback record, returning its row id.
    pub fn insert_feedback(&self, record: &FeedbackRecord) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT INTO feedback (created_at, rating, comment) VALUES (?1, ?2, ?3)",
            params![
                format_date_time(&record.created_at),
                record.rating,
                record.comment
            ],
        )?;
        let id = conn.last_insert_rowid();
        log::info!("[ATD] query: insert_feedback stored record {}", id);
        Ok(id)
    }

    /// Get all feedback in submission order.
    pub fn query_feedback(&self) -> anyhow::Result<Vec<FeedbackRow>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT id, created_at, rating, comment FROM feedback ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FeedbackRow {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    rating: row.get(2)?,
                    comment: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[ATD] query: query_feedback returned {} records", rows.len());
        Ok(rows)
    }
}

impl RideSource for Database {
    fn fetch_rides(&self, since: NaiveDate) -> anyhow::Result<Vec<RawRideRow>> {
        self.query_rides_since(&format_date(&since))
    }
}

impl ForecastSource for Database {
    fn fetch_forecast(&self) -> anyhow::Result<Vec<f64>> {
        self.query_forecast_values()
    }
}

impl FeedbackSink for Database {
    fn append_feedback(&self, record: &FeedbackRecord) -> anyhow::Result<()> {
        self.insert_feedback(record).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atd_series::config::PipelineConfig;
    use atd_series::pipeline::run_forecast_from;
    use atd_utils::dates::{DATE_FORMAT, TIME_FORMAT};
    use chrono::{NaiveDateTime, TimeDelta};

    fn sample_rides_db() -> Database {
        let db = Database::new().unwrap();
        let rides_csv = "\
date,time,category_1,category_2,category_3,category_4
2024-05-31,23:45:00,1,1,1,1
2024-06-01,10:15:00,3,3,3,3
2024-06-01,10:00:00,4,2,0,1
2024-06-02,08:00:00,5,0,0,0
";
        db.load_rides(rides_csv).unwrap();
        db
    }

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn query_rides_since_filters_and_orders() {
        let db = sample_rides_db();
        let rows = db.query_rides_since("2024-06-01").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].time, "10:00:00");
        assert_eq!(rows[0].counts, [4, 2, 0, 1]);
        assert_eq!(rows[1].time, "10:15:00");
        assert_eq!(rows[2].date, "2024-06-02");
    }

    #[test]
    fn query_rides_since_empty() {
        let db = sample_rides_db();
        assert!(db.query_rides_since("2025-01-01").unwrap().is_empty());
    }

    #[test]
    fn query_ride_date_range() {
        let db = sample_rides_db();
        let range = db.query_ride_date_range().unwrap().unwrap();
        assert_eq!(range.first, "2024-05-31");
        assert_eq!(range.last, "2024-06-02");
    }

    #[test]
    fn query_ride_date_range_empty_table() {
        let db = Database::new().unwrap();
        assert!(db.query_ride_date_range().unwrap().is_none());
    }

    #[test]
    fn query_forecast_rows() {
        let db = Database::new().unwrap();
        db.load_forecast("timestamp,value\n2024-06-02 12:00:00,5\n2024-06-02 12:15:00,6\n")
            .unwrap();
        let rows = db.query_forecast().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].timestamp, "2024-06-02 12:15:00");
        assert_eq!(rows[1].value, 6.0);
    }

    #[test]
    fn insert_feedback_appends() {
        let db = Database::new().unwrap();
        let first = FeedbackRecord::new(reference(), Some(4), "useful").unwrap();
        let second = FeedbackRecord::new(reference(), None, "").unwrap();
        let a = db.insert_feedback(&first).unwrap();
        let b = db.insert_feedback(&second).unwrap();
        assert!(b > a);

        let (created_at, rating, comment): (String, Option<u8>, String) = db
            .conn
            .borrow()
            .query_row(
                "SELECT created_at, rating, comment FROM feedback WHERE id = ?1",
                [a],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(created_at, "2024-06-02 12:00:00");
        assert_eq!(rating, Some(4));
        assert_eq!(comment, "useful");
    }

    #[test]
    fn query_feedback_in_submission_order() {
        let db = Database::new().unwrap();
        assert!(db.query_feedback().unwrap().is_empty());

        db.append_feedback(&FeedbackRecord::new(reference(), Some(2), "late").unwrap())
            .unwrap();
        db.append_feedback(&FeedbackRecord::new(reference(), None, "").unwrap())
            .unwrap();

        let rows = db.query_feedback().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].id < rows[1].id);
        assert_eq!(rows[0].created_at, "2024-06-02 12:00:00");
        assert_eq!(rows[0].rating, Some(2));
        assert_eq!(rows[0].comment, "late");
        assert_eq!(rows[1].rating, None);
    }

    #[test]
    fn ride_source_uses_date_lower_bound() {
        let db = sample_rides_db();
        let since = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let rows = db.fetch_rides(since).unwrap();
        assert_eq!(rows.len(), 1);
    }

    /// Import a day of rides and a forecast, then run the whole pipeline
    /// against the database.
    #[test]
    fn forecast_workflow_from_database() {
        let db = Database::new().unwrap();

        let start = reference() - TimeDelta::hours(25);
        let mut rides = String::from("date,time,category_1,category_2,category_3,category_4\n");
        for i in 0..100 {
            let t = start + TimeDelta::minutes(15 * i);
            let counts = if i % 2 == 0 { "5,5,0,0" } else { "30,30,30,0" };
            rides.push_str(&format!(
                "{},{},{}\n",
                t.format(DATE_FORMAT),
                t.format(TIME_FORMAT),
                counts
            ));
        }
        assert_eq!(db.load_rides(&rides).unwrap(), 100);

        let mut forecast = String::from("timestamp,value\n");
        for i in 0..96 {
            let t = reference() + TimeDelta::minutes(15 * i);
            let v = 200.0 * (1.0 - (i as f64 - 48.0).abs() / 48.0);
            forecast.push_str(&format!("{},{}\n", format_date_time(&t), v));
        }
        assert_eq!(db.load_forecast(&forecast).unwrap(), 96);

        let result = run_forecast_from(&db, &db, reference(), &PipelineConfig::default()).unwrap();
        assert_eq!(result.history.len(), 97);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(
            result.segments[0].peak_time,
            reference() + TimeDelta::minutes(15 * 48)
        );
        assert_eq!(result.merged.last().unwrap().time, reference());

        db.append_feedback(&FeedbackRecord::new(reference(), Some(5), "spot on").unwrap())
            .unwrap();
    }
}
