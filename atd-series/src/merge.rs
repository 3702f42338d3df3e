//! Series Merger: observed history stitched to the forecast for display.

use crate::config::MergeConfig;
use crate::error::Result;
use crate::model::{DemandPoint, DemandSeries};
use crate::smoother::{clip_negative, smooth};
use chrono::NaiveDateTime;

/// Build the displayed observed line.
///
/// `forecast` is the smoothed, clipped forecast starting at `reference_time`.
/// History points before `reference_time` are smoothed together with the
/// first `seam_points` forecast points so the line bends towards the
/// forecast instead of ending in a seam; those helper points are then
/// dropped. A final point at exactly `reference_time` carries the leading
/// forecast value, or the last history value when the forecast is empty.
pub fn merge(
    history: &DemandSeries,
    forecast: &DemandSeries,
    reference_time: NaiveDateTime,
    config: &MergeConfig,
) -> Result<DemandSeries> {
    let observed: Vec<DemandPoint> = history
        .points()
        .iter()
        .filter(|p| p.time < reference_time)
        .copied()
        .collect();

    let ahead: Vec<DemandPoint> = forecast
        .points()
        .iter()
        .filter(|p| p.time >= reference_time)
        .copied()
        .collect();
    let helpers: Vec<f64> = ahead
        .iter()
        .take(config.seam_points)
        .map(|p| p.value)
        .collect();

    let mut values: Vec<f64> = observed.iter().map(|p| p.value).collect();
    if config.smoothing.is_enabled() && !observed.is_empty() {
        let mut combined = values.clone();
        combined.extend_from_slice(&helpers);
        let smoothed = smooth(&combined, config.smoothing)?;
        values.copy_from_slice(&smoothed[..observed.len()]);
    }
    clip_negative(&mut values);

    let boundary_value = ahead
        .first()
        .map(|p| p.value)
        .or_else(|| values.last().copied())
        .unwrap_or(0.0);

    let mut merged = DemandSeries::new(history.step());
    for (point, value) in observed.iter().zip(values) {
        merged.push(DemandPoint::new(point.time, value))?;
    }
    merged.push(DemandPoint::new(reference_time, boundary_value.max(0.0)))?;

    log::debug!(
        "[ATD] merge: {} observed points, {} seam helpers, boundary value {:.1}",
        observed.len(),
        helpers.len(),
        boundary_value
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmoothingConfig;
    use crate::error::SeriesError;
    use crate::segments::smooth_forecast;
    use chrono::{NaiveDate, TimeDelta};

    fn step() -> TimeDelta {
        TimeDelta::minutes(15)
    }

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn history(values: &[f64]) -> DemandSeries {
        let start = reference() - step() * values.len() as i32;
        DemandSeries::from_values(start, step(), values)
    }

    fn alternating(n: usize) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { 10.0 } else { 90.0 }).collect()
    }

    fn no_forecast() -> DemandSeries {
        DemandSeries::new(step())
    }

    /// Triangle rising from 0 at the reference time to 200 after twelve hours.
    fn smoothed_triangle() -> DemandSeries {
        let values: Vec<f64> = (0..96)
            .map(|i| 200.0 * (1.0 - (i as f64 - 48.0).abs() / 48.0))
            .collect();
        let forecast = DemandSeries::from_values(reference(), step(), &values);
        smooth_forecast(&forecast, SmoothingConfig::default()).unwrap()
    }

    #[test]
    fn merged_series_is_continuous_up_to_reference() {
        let merged = merge(&history(&alternating(97)), &smoothed_triangle(), reference(), &MergeConfig::default()).unwrap();

        assert_eq!(merged.len(), 98);
        assert!(merged.is_gapless());
        assert_eq!(
            merged.points().iter().filter(|p| p.time == reference()).count(),
            1
        );
        assert_eq!(merged.last().unwrap().time, reference());
        for w in merged.points().windows(2) {
            assert!(w[0].time < w[1].time);
        }
    }

    #[test]
    fn boundary_takes_leading_forecast_value() {
        let forecast = smoothed_triangle();
        let merged = merge(&history(&alternating(97)), &forecast, reference(), &MergeConfig::default()).unwrap();
        assert_eq!(merged.last().unwrap().value, forecast.first().unwrap().value);
    }

    #[test]
    fn quiet_forecast_start_does_not_lift_observed_tail() {
        let merged = merge(&history(&[10.0; 97]), &smoothed_triangle(), reference(), &MergeConfig::default()).unwrap();

        let boundary = merged.last().unwrap();
        assert_eq!(boundary.time, reference());
        assert!(boundary.value < 1.0, "boundary {}", boundary.value);

        let tail = &merged.values()[merged.len() - 6..merged.len() - 1];
        for v in tail {
            assert!(*v <= 11.0, "tail {:?}", tail);
        }
        assert!(tail[4] < 10.0, "tail {:?}", tail);
        for p in &merged.points()[..merged.len() - 6] {
            assert!((p.value - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn helper_points_are_not_displayed() {
        let merged = merge(&history(&alternating(97)), &smoothed_triangle(), reference(), &MergeConfig::default()).unwrap();
        assert!(merged.points().iter().all(|p| p.time <= reference()));
    }

    #[test]
    fn alternating_history_is_smoothed_and_non_negative() {
        let merged = merge(&history(&alternating(97)), &no_forecast(), reference(), &MergeConfig::default()).unwrap();
        assert!(merged.points().iter().all(|p| p.value >= 0.0));
        let interior = merged.points()[48].value;
        assert!(interior > 10.0 && interior < 90.0, "interior {}", interior);
    }

    #[test]
    fn without_forecast_boundary_repeats_last_history_value() {
        let merged = merge(&history(&[30.0; 20]), &no_forecast(), reference(), &MergeConfig::default()).unwrap();
        assert_eq!(merged.len(), 21);
        let last = merged.last().unwrap();
        assert_eq!(last.time, reference());
        assert!((last.value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn history_at_or_after_reference_is_dropped() {
        let start = reference() - step() * 10;
        let long = DemandSeries::from_values(start, step(), &[5.0; 14]);
        let merged = merge(&long, &no_forecast(), reference(), &MergeConfig::default()).unwrap();
        assert_eq!(merged.len(), 11);
        assert_eq!(
            merged.points().iter().filter(|p| p.time == reference()).count(),
            1
        );
    }

    #[test]
    fn constant_history_and_forecast_stay_constant() {
        let forecast = DemandSeries::from_values(reference(), step(), &[40.0; 96]);
        let merged = merge(&history(&[40.0; 30]), &forecast, reference(), &MergeConfig::default()).unwrap();
        for p in merged.points() {
            assert!((p.value - 40.0).abs() < 1e-9);
        }
    }

    #[test]
    fn smoothing_can_be_disabled() {
        let config = MergeConfig {
            smoothing: SmoothingConfig::disabled(),
            ..MergeConfig::default()
        };
        let merged = merge(&history(&alternating(10)), &no_forecast(), reference(), &config).unwrap();
        assert_eq!(merged.values()[..10], alternating(10)[..]);
    }

    #[test]
    fn too_short_history_fails() {
        let err = merge(&history(&[1.0; 4]), &no_forecast(), reference(), &MergeConfig::default()).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidSmoothingWindow { .. }));
    }
}
