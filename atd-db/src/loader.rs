//! CSV import into the taxi demand database.
//!
//! # CSV Formats
//!
//! - **Rides** (has headers): `date,time,category_1,category_2,category_3,category_4`
//! - **Forecast** (has headers): `timestamp,value`

use crate::Database;
use atd_utils::dates::{format_date, format_date_time, parse_date, parse_date_time, parse_time};
use rusqlite::params;

impl Database {
    /// Load ride counts from CSV string, returning the number of rows stored.
    ///
    /// Expected format (with headers): `date,time,category_1,category_2,category_3,category_4`
    ///
    /// Dates and times are normalised to `YYYY-MM-DD` and `HH:MM:SS`. A row
    /// for an already stored date and time replaces it. Rows with an
    /// unreadable timestamp or a count that is not a non-negative integer
    /// are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// date,time,category_1,category_2,category_3,category_4
    /// 2024-06-01,10:15:00,4,2,0,1
    /// ```
    pub fn load_rides(&self, csv_data: &str) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in rdr.records() {
            let r = result?;
            let date = r.get(0).unwrap_or("").trim();
            let time = r.get(1).unwrap_or("").trim();

            let (date, time) = match (parse_date(date), parse_time(time)) {
                (Ok(d), Ok(t)) => (format_date(&d), t.format("%H:%M:%S").to_string()),
                _ => {
                    log::warn!("[ATD] loader: skipping ride row with timestamp '{} {}'", date, time);
                    skipped += 1;
                    continue;
                }
            };

            let counts: Option<Vec<i64>> = (2..6)
                .map(|i| {
                    r.get(i)
                        .and_then(|s| s.trim().parse::<i64>().ok())
                        .filter(|v| *v >= 0)
                })
                .collect();
            let Some(c) = counts else {
                log::warn!("[ATD] loader: skipping ride row {} {} with invalid counts", date, time);
                skipped += 1;
                continue;
            };

            conn.execute(
                "INSERT OR REPLACE INTO rides
                 (date, time, category_1, category_2, category_3, category_4)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![date, time, c[0], c[1], c[2], c[3]],
            )?;
            count += 1;
        }
        log::info!("[ATD] loader: Loaded {} ride rows, skipped {}", count, skipped);
        Ok(count)
    }

    /// Replace the stored forecast with the rows of a CSV string, returning
    /// the number of forecast steps stored.
    ///
    /// Expected format (with headers): `timestamp,value`
    ///
    /// Rows keep their file order as horizon positions. The previous
    /// forecast is only removed once every new row has been accepted; an
    /// unreadable row aborts the import and leaves the old forecast intact.
    ///
    /// # Example CSV
    /// ```text
    /// timestamp,value
    /// 2024-06-01 10:00:00,42.5
    /// ```
    pub fn load_forecast(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM forecast", [])?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut position = 0i64;
        for result in rdr.records() {
            let r = result?;
            let raw_timestamp = r.get(0).unwrap_or("").trim();
            let raw_value = r.get(1).unwrap_or("").trim();

            let timestamp = parse_date_time(raw_timestamp)?;
            let value: f64 = raw_value.parse().map_err(|_| {
                anyhow::anyhow!("forecast row {}: invalid value '{}'", position + 1, raw_value)
            })?;
            if !value.is_finite() {
                anyhow::bail!("forecast row {}: value '{}' is not finite", position + 1, raw_value);
            }

            tx.execute(
                "INSERT INTO forecast (position, timestamp, value) VALUES (?1, ?2, ?3)",
                params![position, format_date_time(&timestamp), value],
            )?;
            position += 1;
        }
        tx.commit()?;
        log::info!("[ATD] loader: Loaded {} forecast steps", position);
        Ok(position as usize)
    }
}
