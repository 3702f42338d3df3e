//! Pipeline configuration.
//!
//! Every threshold, window and offset used by the pipeline lives here so
//! callers (and tests) can vary them without touching pipeline logic. All
//! sections deserialize with defaults, so a settings file only needs the
//! fields it overrides.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Local polynomial smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Odd window length; 0 disables smoothing where that is allowed.
    pub window: usize,
    /// Degree of the fitted polynomial.
    pub degree: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window: 9, degree: 2 }
    }
}

impl SmoothingConfig {
    pub fn disabled() -> Self {
        Self {
            window: 0,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.window > 0
    }
}

/// Series Loader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Bucket width in minutes.
    pub step_minutes: u32,
    /// Length of the returned history window in hours.
    pub window_hours: u32,
    /// Extra history fetched before the window so forward filling has a prior value.
    pub lookback_hours: u32,
    /// Per-category bucket values above this are treated as missing.
    pub outlier_threshold: u32,
    pub smoothing: SmoothingConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            step_minutes: 15,
            window_hours: 24,
            lookback_hours: 24,
            outlier_threshold: 60,
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl LoaderConfig {
    pub fn step(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.step_minutes))
    }

    pub fn window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.window_hours))
    }

    pub fn lookback(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.lookback_hours))
    }
}

/// Segment Detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Runs whose total does not exceed this are discarded.
    pub min_segment_sum: f64,
    /// Runs whose peak does not exceed this are discarded.
    pub min_peak: f64,
    /// Fixed "over" threshold; the forecast mean is used when absent.
    pub mean_threshold: Option<f64>,
    /// Displayed totals are rounded to a multiple of this.
    pub display_rounding: f64,
    pub smoothing: SmoothingConfig,
    /// Lower bounds (on the displayed total) of the Busy, VeryBusy and Peak levels.
    pub level_thresholds: [i64; 3],
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_segment_sum: 150.0,
            min_peak: 20.0,
            mean_threshold: None,
            display_rounding: 10.0,
            smoothing: SmoothingConfig::default(),
            level_thresholds: [180, 330, 490],
        }
    }
}

/// Series Merger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Forecast points borrowed to condition the smoothing across the seam.
    pub seam_points: usize,
    pub smoothing: SmoothingConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            seam_points: 9,
            smoothing: SmoothingConfig::default(),
        }
    }
}

/// Chart description settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub tick_interval_hours: u32,
    /// Distance of the observed/forecast captions from the reference marker.
    pub caption_offset_hours: u32,
    /// Added to the largest plotted value to get the y axis maximum.
    pub y_headroom: f64,
    /// Peak labels are drawn this far above the peak.
    pub label_offset: f64,
    pub observed_caption: String,
    pub forecast_caption: String,
    pub y_axis_title: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            tick_interval_hours: 2,
            caption_offset_hours: 6,
            y_headroom: 5.0,
            label_offset: 2.0,
            observed_caption: "observed".to_string(),
            forecast_caption: "forecast".to_string(),
            y_axis_title: "Passengers / 15 min".to_string(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub loader: LoaderConfig,
    pub segments: SegmentConfig,
    pub merge: MergeConfig,
    pub chart: ChartConfig,
}
