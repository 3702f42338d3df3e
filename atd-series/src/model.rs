//! Value types flowing through the pipeline.
//!
//! Series, points and segments derive `Serialize` so the chart
//! description can be handed to a renderer as JSON.

use crate::error::{Result, SeriesError};
use atd_utils::dates::{parse_date, parse_time};
use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

/// Number of demand categories counted per bucket.
pub const CATEGORY_COUNT: usize = 4;

/// Maximum length of a feedback comment in characters.
pub const MAX_COMMENT_CHARS: usize = 256;

/// A ride row as the storage layer hands it over: unparsed date and
/// time text plus the four category counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRideRow {
    pub date: String,
    pub time: String,
    pub counts: [i64; CATEGORY_COUNT],
}

/// One parsed ride observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideRecord {
    pub time: NaiveDateTime,
    pub counts: [u32; CATEGORY_COUNT],
}

impl TryFrom<&RawRideRow> for RideRecord {
    type Error = SeriesError;

    fn try_from(row: &RawRideRow) -> Result<Self> {
        let malformed = |reason: String| SeriesError::MalformedRow {
            row: format!("{} {}", row.date, row.time),
            reason,
        };
        let date = parse_date(&row.date).map_err(|e| malformed(e.to_string()))?;
        let time = parse_time(&row.time).map_err(|e| malformed(e.to_string()))?;

        let mut counts = [0u32; CATEGORY_COUNT];
        for (slot, &raw) in counts.iter_mut().zip(row.counts.iter()) {
            *slot = u32::try_from(raw)
                .map_err(|_| malformed(format!("count {} is not a non-negative integer", raw)))?;
        }

        Ok(RideRecord {
            time: date.and_time(time),
            counts,
        })
    }
}

/// A single (timestamp, value) pair of a demand series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandPoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

impl DemandPoint {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        DemandPoint { time, value }
    }
}

/// An ordered demand series with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSeries {
    #[serde(skip)]
    step: TimeDelta,
    points: Vec<DemandPoint>,
}

impl DemandSeries {
    pub fn new(step: TimeDelta) -> Self {
        DemandSeries {
            step,
            points: Vec::new(),
        }
    }

    /// Build a series from points, rejecting anything that is not
    /// strictly increasing in time.
    pub fn from_points(step: TimeDelta, points: Vec<DemandPoint>) -> Result<Self> {
        let mut series = DemandSeries::new(step);
        series.points.reserve(points.len());
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    /// Lay out `values` on the grid starting at `start`.
    pub fn from_values(start: NaiveDateTime, step: TimeDelta, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| DemandPoint::new(start + step * i as i32, value))
            .collect();
        DemandSeries { step, points }
    }

    pub fn push(&mut self, point: DemandPoint) -> Result<()> {
        if let Some(last) = self.points.last() {
            if point.time <= last.time {
                return Err(SeriesError::OutOfOrder {
                    previous: last.time,
                    next: point.time,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn step(&self) -> TimeDelta {
        self.step
    }

    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DemandPoint> {
        self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DemandPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DemandPoint> {
        self.points.last()
    }

    /// True when consecutive points are never more than one step apart.
    pub fn is_gapless(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[1].time - w[0].time <= self.step)
    }

    /// Largest value, or 0 for an empty series.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}

/// Demand band of a segment, used by the renderer to pick a fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Moderate,
    Busy,
    VeryBusy,
    Peak,
}

impl DemandLevel {
    /// Classify a displayed total against ascending `[busy, very_busy, peak]` bounds.
    pub fn from_total(total: i64, thresholds: &[i64; 3]) -> Self {
        if total >= thresholds[2] {
            DemandLevel::Peak
        } else if total >= thresholds[1] {
            DemandLevel::VeryBusy
        } else if total >= thresholds[0] {
            DemandLevel::Busy
        } else {
            DemandLevel::Moderate
        }
    }
}

/// A contiguous busy interval of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// First busy bucket.
    pub start: NaiveDateTime,
    /// Last busy bucket (the taper point in `points` is not included).
    pub end: NaiveDateTime,
    /// Total of the raw forecast values over the busy run.
    pub sum: f64,
    /// Largest smoothed value over `points`.
    pub peak_value: f64,
    /// First timestamp at which `peak_value` occurs.
    pub peak_time: NaiveDateTime,
    /// `sum` rounded to the nearest ten.
    pub display_sum: i64,
    pub level: DemandLevel,
    /// Smoothed values of the run plus one taper point when available.
    pub points: Vec<DemandPoint>,
}

impl Segment {
    /// Whether the peak label should be drawn. The label is suppressed
    /// when the peak coincides with the segment's first point.
    pub fn shows_peak_label(&self) -> bool {
        self.points
            .first()
            .is_some_and(|first| first.time != self.peak_time)
    }
}

/// A user feedback submission, written once and never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    pub created_at: NaiveDateTime,
    pub rating: Option<u8>,
    pub comment: String,
}

impl FeedbackRecord {
    pub fn new(created_at: NaiveDateTime, rating: Option<u8>, comment: &str) -> Result<Self> {
        if let Some(r) = rating {
            if !(1..=5).contains(&r) {
                return Err(SeriesError::InvalidFeedback(format!(
                    "rating {} is outside 1-5",
                    r
                )));
            }
        }
        let chars = comment.chars().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(SeriesError::InvalidFeedback(format!(
                "comment has {} characters, at most {} allowed",
                chars, MAX_COMMENT_CHARS
            )));
        }
        Ok(FeedbackRecord {
            created_at,
            rating,
            comment: comment.to_string(),
        })
    }
}
