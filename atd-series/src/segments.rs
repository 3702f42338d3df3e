//! Segment Detector: contiguous busy intervals of a forecast.
//!
//! A point is "over" when its value exceeds the forecast mean (or a fixed
//! threshold). Maximal runs of over points are kept when their total and
//! their peak clear the configured minimums. The published points are taken
//! from the whole forecast smoothed once, so run boundaries see their
//! neighbours.

use crate::config::{SegmentConfig, SmoothingConfig};
use crate::error::Result;
use crate::model::{DemandLevel, DemandPoint, DemandSeries, Segment};
use crate::smoother::{clip_negative, smooth_non_negative};
use std::ops::Range;

/// Detect busy segments in `forecast`, in chronological order.
pub fn detect_segments(forecast: &DemandSeries, config: &SegmentConfig) -> Result<Vec<Segment>> {
    let points = forecast.points();
    if points.is_empty() {
        return Ok(Vec::new());
    }
    let values = forecast.values();

    let threshold = config
        .mean_threshold
        .unwrap_or_else(|| values.iter().sum::<f64>() / values.len() as f64);

    let runs: Vec<Range<usize>> = over_runs(&values, threshold)
        .into_iter()
        .filter(|run| {
            let slice = &values[run.clone()];
            let sum: f64 = slice.iter().sum();
            let max = slice.iter().copied().fold(f64::MIN, f64::max);
            sum > config.min_segment_sum && max > config.min_peak
        })
        .collect();

    if runs.is_empty() {
        log::debug!("[ATD] segments: no busy runs above {:.1}", threshold);
        return Ok(Vec::new());
    }

    let smoothed = smooth_forecast(forecast, config.smoothing)?.values();

    let mut segments = Vec::with_capacity(runs.len());
    for run in runs {
        let sum: f64 = values[run.clone()].iter().sum();
        let taper_end = (run.end + 1).min(points.len());
        let run_points: Vec<DemandPoint> = (run.start..taper_end)
            .map(|i| DemandPoint::new(points[i].time, smoothed[i]))
            .collect();

        let Some(peak) = first_peak(&run_points) else {
            continue;
        };
        if peak.value <= config.min_peak {
            log::debug!(
                "[ATD] segments: run at {} dropped, smoothed peak {:.1} not above {:.1}",
                points[run.start].time,
                peak.value,
                config.min_peak
            );
            continue;
        }

        let display_sum = round_to_nearest(sum, config.display_rounding);
        segments.push(Segment {
            start: points[run.start].time,
            end: points[run.end - 1].time,
            sum,
            peak_value: peak.value,
            peak_time: peak.time,
            display_sum,
            level: DemandLevel::from_total(display_sum, &config.level_thresholds),
            points: run_points,
        });
    }

    log::info!("[ATD] segments: detected {} busy segments", segments.len());
    Ok(segments)
}

/// The whole forecast smoothed once and clipped at zero, on the same grid.
///
/// An empty forecast stays empty. With smoothing disabled the values are
/// only clipped.
pub fn smooth_forecast(forecast: &DemandSeries, smoothing: SmoothingConfig) -> Result<DemandSeries> {
    let values = if forecast.is_empty() {
        Vec::new()
    } else if smoothing.is_enabled() {
        smooth_non_negative(&forecast.values(), smoothing)?
    } else {
        let mut raw = forecast.values();
        clip_negative(&mut raw);
        raw
    };
    let points = forecast
        .points()
        .iter()
        .zip(values)
        .map(|(p, v)| DemandPoint::new(p.time, v))
        .collect();
    DemandSeries::from_points(forecast.step(), points)
}

/// Maximal runs of consecutive indices whose value exceeds `threshold`.
fn over_runs(values: &[f64], threshold: f64) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match (start, *v > threshold) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..values.len());
    }
    runs
}

/// The largest point; ties resolve to the earliest.
fn first_peak(points: &[DemandPoint]) -> Option<DemandPoint> {
    points.iter().copied().fold(None, |best, p| match best {
        Some(b) if b.value >= p.value => Some(b),
        _ => Some(p),
    })
}

/// Round to the nearest multiple, ties to even (145 -> 140, 155 -> 160).
pub fn round_to_nearest(value: f64, multiple: f64) -> i64 {
    if multiple <= 0.0 {
        return value.round_ties_even() as i64;
    }
    ((value / multiple).round_ties_even() * multiple) as i64
}
