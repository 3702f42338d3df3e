//! One forecast run: load, detect, merge, describe.

use crate::chart::ChartSpec;
use crate::config::{LoaderConfig, PipelineConfig, SmoothingConfig};
use crate::error::Result;
use crate::loader::load_history;
use crate::merge::merge;
use crate::model::{DemandSeries, Segment};
use crate::segments::{detect_segments, smooth_forecast};
use crate::source::{ForecastSource, RideSource};
use atd_utils::dates::floor_to_step;
use chrono::NaiveDateTime;

/// Everything produced by a single run.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub reference_time: NaiveDateTime,
    /// Repaired, unsmoothed observed demand.
    pub history: DemandSeries,
    pub forecast: DemandSeries,
    /// Forecast smoothed over the whole horizon and clipped at zero.
    pub smoothed_forecast: DemandSeries,
    pub segments: Vec<Segment>,
    /// Smoothed observed line ending at the reference time.
    pub merged: DemandSeries,
    pub chart: ChartSpec,
}

/// Run the pipeline for `reference_time` with forecast values that start
/// at the (floored) reference time.
pub fn run_forecast<R: RideSource + ?Sized>(
    rides: &R,
    forecast_values: &[f64],
    reference_time: NaiveDateTime,
    config: &PipelineConfig,
) -> Result<Forecast> {
    let reference_time = floor_to_step(reference_time, config.loader.step_minutes);

    // The merger smooths across the seam, so history is loaded raw.
    let loader = LoaderConfig {
        smoothing: SmoothingConfig::disabled(),
        ..config.loader.clone()
    };
    let history = load_history(rides, reference_time, &loader)?;

    let forecast = DemandSeries::from_values(reference_time, loader.step(), forecast_values);
    let segments = detect_segments(&forecast, &config.segments)?;
    let smoothed_forecast = smooth_forecast(&forecast, config.segments.smoothing)?;
    let merged = merge(&history, &smoothed_forecast, reference_time, &config.merge)?;
    let chart = ChartSpec::build(&merged, &smoothed_forecast, &segments, reference_time, &config.chart);

    log::info!(
        "[ATD] forecast at {}: {} history points, {} forecast values, {} segments",
        reference_time,
        history.len(),
        forecast.len(),
        segments.len()
    );

    Ok(Forecast {
        reference_time,
        history,
        forecast,
        smoothed_forecast,
        segments,
        merged,
        chart,
    })
}

/// Same as [`run_forecast`], reading the forecast values from storage.
pub fn run_forecast_from<R, F>(
    rides: &R,
    forecasts: &F,
    reference_time: NaiveDateTime,
    config: &PipelineConfig,
) -> Result<Forecast>
where
    R: RideSource + ?Sized,
    F: ForecastSource + ?Sized,
{
    let values = forecasts.fetch_forecast()?;
    run_forecast(rides, &values, reference_time, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeriesError;
    use crate::model::{DemandLevel, RawRideRow};
    use atd_utils::dates::{DATE_FORMAT, TIME_FORMAT};
    use chrono::{NaiveDate, TimeDelta};

    struct Rides(Vec<RawRideRow>);

    impl RideSource for Rides {
        fn fetch_rides(&self, since: NaiveDate) -> anyhow::Result<Vec<RawRideRow>> {
            let since = since.format(DATE_FORMAT).to_string();
            Ok(self.0.iter().filter(|r| r.date >= since).cloned().collect())
        }
    }

    struct StoredForecast(Vec<f64>);

    impl ForecastSource for StoredForecast {
        fn fetch_forecast(&self) -> anyhow::Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn step() -> TimeDelta {
        TimeDelta::minutes(15)
    }

    /// 25 hours of rides alternating between totals of 10 and 90.
    fn alternating_rides() -> Rides {
        let start = reference() - TimeDelta::hours(25);
        let rows = (0..100)
            .map(|i| {
                let t = start + step() * i;
                let counts = if i % 2 == 0 { [5, 5, 0, 0] } else { [30, 30, 30, 0] };
                RawRideRow {
                    date: t.format(DATE_FORMAT).to_string(),
                    time: t.format(TIME_FORMAT).to_string(),
                    counts,
                }
            })
            .collect();
        Rides(rows)
    }

    fn triangle() -> Vec<f64> {
        (0..96)
            .map(|i| 200.0 * (1.0 - (i as f64 - 48.0).abs() / 48.0))
            .collect()
    }

    #[test]
    fn end_to_end_single_peak() {
        let forecast = run_forecast(
            &alternating_rides(),
            &triangle(),
            reference(),
            &PipelineConfig::default(),
        )
        .unwrap();

        assert_eq!(forecast.history.len(), 97);
        assert!(forecast.history.values().iter().all(|v| *v == 10.0 || *v == 90.0));

        assert_eq!(forecast.segments.len(), 1);
        let segment = &forecast.segments[0];
        assert_eq!(segment.peak_time, reference() + step() * 48);
        assert_eq!(segment.level, DemandLevel::Peak);

        let merged = &forecast.merged;
        assert_eq!(merged.len(), 98);
        assert!(merged.is_gapless());
        assert_eq!(merged.last().unwrap().time, reference());
        assert!(merged.points().iter().all(|p| p.value >= 0.0));
        let boundary = merged.last().unwrap().value;
        assert_eq!(boundary, forecast.smoothed_forecast.first().unwrap().value);
        assert!(boundary < 1.0, "boundary {}", boundary);

        let chart = &forecast.chart;
        assert_eq!(chart.forecast.len(), 96);
        assert_eq!(chart.forecast[0].time, reference());
        assert_eq!(chart.regions.len(), 1);
        assert!(chart.regions[0].label.is_some());
        assert!(chart.y_max >= segment.peak_value + 5.0);
        assert_eq!(chart.reference_marker, reference());
        assert_eq!(chart.clock_label, "12:00");
    }

    #[test]
    fn reference_time_is_floored_to_grid() {
        let late = reference() + TimeDelta::minutes(7);
        let forecast = run_forecast(
            &alternating_rides(),
            &triangle(),
            late,
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(forecast.reference_time, reference());
        assert_eq!(forecast.forecast.first().unwrap().time, reference());
    }

    #[test]
    fn flat_forecast_has_no_regions() {
        let forecast = run_forecast(
            &alternating_rides(),
            &[40.0; 96],
            reference(),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(forecast.segments.is_empty());
        assert!(forecast.chart.regions.is_empty());
        assert_eq!(forecast.chart.forecast.len(), 96);
        let boundary = forecast.merged.last().unwrap();
        assert_eq!(boundary.time, reference());
        assert!((boundary.value - 40.0).abs() < 1e-9);
    }

    #[test]
    fn reads_forecast_from_source() {
        let forecast = run_forecast_from(
            &alternating_rides(),
            &StoredForecast(triangle()),
            reference(),
            &PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(forecast.forecast.len(), 96);
        assert_eq!(forecast.segments.len(), 1);
    }

    #[test]
    fn no_rides_is_data_unavailable() {
        let err = run_forecast(
            &Rides(Vec::new()),
            &triangle(),
            reference(),
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SeriesError::DataUnavailable { .. }));
    }
}
