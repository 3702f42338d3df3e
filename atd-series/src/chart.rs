//! Renderer-neutral chart description.
//!
//! `ChartSpec` carries everything a renderer needs to draw the demand
//! chart: the merged observed line, the smoothed forecast line over the
//! whole horizon, one filled region per busy segment, the reference marker with its clock caption and the axis ticks. It is
//! built once per run and serialised to JSON for the frontend.

use crate::config::ChartConfig;
use crate::model::{DemandLevel, DemandPoint, DemandSeries, Segment};
use atd_utils::dates::{format_clock, format_day_month};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub observed: Vec<DemandPoint>,
    pub forecast: Vec<DemandPoint>,
    pub regions: Vec<ChartRegion>,
    pub reference_marker: NaiveDateTime,
    pub clock_label: String,
    pub captions: Vec<Caption>,
    pub x_ticks: Vec<AxisTick>,
    pub y_max: f64,
    pub y_axis_title: String,
}

/// Filled area of one busy segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRegion {
    pub points: Vec<DemandPoint>,
    pub level: DemandLevel,
    pub label: Option<PeakLabel>,
}

/// Displayed total drawn above a segment's peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakLabel {
    pub time: NaiveDateTime,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub time: NaiveDateTime,
    pub text: String,
}

/// An x axis tick; `label` may span two lines (`"00:00\n2.6"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTick {
    pub time: NaiveDateTime,
    pub label: String,
}

impl ChartSpec {
    /// Assemble the chart from the merged series, the smoothed forecast
    /// and its segments.
    pub fn build(
        observed: &DemandSeries,
        forecast: &DemandSeries,
        segments: &[Segment],
        reference_time: NaiveDateTime,
        config: &ChartConfig,
    ) -> Self {
        let regions = segments
            .iter()
            .map(|segment| ChartRegion {
                points: segment.points.clone(),
                level: segment.level,
                label: segment.shows_peak_label().then(|| PeakLabel {
                    time: segment.peak_time,
                    y: segment.peak_value + config.label_offset,
                    text: segment.display_sum.to_string(),
                }),
            })
            .collect();

        let plotted_max = forecast
            .points()
            .iter()
            .chain(segments.iter().flat_map(|s| s.points.iter()))
            .map(|p| p.value)
            .fold(observed.max_value(), f64::max);

        let offset = TimeDelta::hours(i64::from(config.caption_offset_hours));
        let captions = vec![
            Caption {
                time: reference_time - offset,
                text: config.observed_caption.clone(),
            },
            Caption {
                time: reference_time + offset,
                text: config.forecast_caption.clone(),
            },
        ];

        let timestamps = observed
            .points()
            .iter()
            .chain(forecast.points())
            .map(|p| p.time);

        ChartSpec {
            observed: observed.points().to_vec(),
            forecast: forecast.points().to_vec(),
            regions,
            reference_marker: reference_time,
            clock_label: format_clock(&reference_time),
            captions,
            x_ticks: axis_ticks(timestamps, config.tick_interval_hours),
            y_max: plotted_max + config.y_headroom,
            y_axis_title: config.y_axis_title.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Ticks on every whole hour divisible by `interval_hours` among the
/// plotted timestamps. Midnight ticks carry the date, and so does the
/// first tick when it is not already a midnight tick.
pub fn axis_ticks(
    timestamps: impl IntoIterator<Item = NaiveDateTime>,
    interval_hours: u32,
) -> Vec<AxisTick> {
    let interval = interval_hours.max(1);
    let on_grid: BTreeSet<NaiveDateTime> = timestamps
        .into_iter()
        .filter(|t| t.minute() == 0 && t.second() == 0 && t.hour() % interval == 0)
        .collect();

    let mut ticks: Vec<AxisTick> = on_grid
        .into_iter()
        .map(|time| {
            let mut label = format_clock(&time);
            if time.hour() == 0 {
                label.push('\n');
                label.push_str(&format_day_month(&time));
            }
            AxisTick { time, label }
        })
        .collect();

    if let Some(first) = ticks.first_mut() {
        if !first.label.contains('\n') {
            first.label.push('\n');
            first.label.push_str(&format_day_month(&first.time));
        }
    }
    ticks
}
