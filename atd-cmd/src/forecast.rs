//! `forecast` command: run the pipeline and emit the chart description.

use crate::settings::Settings;
use atd_db::Database;
use atd_series::pipeline::{run_forecast_from, Forecast};
use atd_series::SeriesError;
use atd_utils::dates::parse_date_time;
use chrono::{NaiveDateTime, Utc};
use std::fs;

/// Run a forecast and write the chart JSON to `output` (stdout when `None`).
///
/// `at` overrides "now" with a wall-clock time in the configured zone.
pub fn run_forecast_command(
    config: Option<&str>,
    at: Option<&str>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let reference = match at {
        Some(s) => parse_date_time(s)?,
        None => settings
            .zone()?
            .reference_time(&Utc::now(), settings.pipeline.loader.step_minutes),
    };

    let db = Database::open(&settings.database)?;
    let forecast = forecast_at(&db, reference, &settings)?;
    let json = forecast.chart.to_json()?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("[ATD] forecast: chart written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Run the pipeline against `db`, logging an unavailable service distinctly.
pub fn forecast_at(
    db: &Database,
    reference: NaiveDateTime,
    settings: &Settings,
) -> anyhow::Result<Forecast> {
    match run_forecast_from(db, db, reference, &settings.pipeline) {
        Ok(forecast) => Ok(forecast),
        Err(e @ SeriesError::DataUnavailable { .. }) => {
            log::error!("[ATD] forecast: service unavailable: {}", e);
            Err(e.into())
        }
        Err(e) => {
            log::error!("[ATD] forecast: failed at {}: {}", reference, e);
            Err(e.into())
        }
    }
}
