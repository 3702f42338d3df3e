//! Settings file support.
//!
//! Settings are read from TOML. Every key is optional:
//!
//! ```toml
//! database = "atd.sqlite"
//! time_zone = "+03:00"
//!
//! [pipeline.loader]
//! outlier_threshold = 60
//!
//! [pipeline.segments]
//! min_segment_sum = 150.0
//! ```

use atd_series::config::PipelineConfig;
use atd_series::grid::reference_time;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the current directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "atd.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file.
    pub database: PathBuf,
    /// `"local"` or a fixed UTC offset such as `"+03:00"`.
    pub time_zone: String,
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("atd.sqlite"),
            time_zone: "local".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read settings file {}: {}", path.display(), e)
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse settings file {}: {}", path.display(), e)
        })?;
        settings.zone()?;
        Ok(settings)
    }

    /// Load settings from `explicit` if given, otherwise from
    /// `atd.toml` in the current directory, otherwise the defaults.
    pub fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            log::info!("[ATD] settings: loading {}", path);
            return Self::from_file(path);
        }
        let default_path = PathBuf::from(DEFAULT_SETTINGS_FILE);
        if default_path.exists() {
            log::info!("[ATD] settings: loading {}", default_path.display());
            return Self::from_file(&default_path);
        }
        log::info!("[ATD] settings: no {} found, using defaults", DEFAULT_SETTINGS_FILE);
        Ok(Self::default())
    }

    pub fn zone(&self) -> anyhow::Result<Zone> {
        Zone::parse(&self.time_zone)
    }
}

/// The time zone all bucketing happens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    /// Parse `"local"`, `"utc"`/`"z"` or a `±HH:MM` / `±HHMM` offset.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" => return Ok(Zone::Local),
            "utc" | "z" => {
                return FixedOffset::east_opt(0)
                    .map(Zone::Fixed)
                    .ok_or_else(|| invalid_zone(s))
            }
            _ => {}
        }

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid_zone(s)),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid_zone(s));
        }
        let hours: i32 = digits[..2].parse()?;
        let minutes: i32 = digits[2..].parse()?;
        if minutes >= 60 {
            return Err(invalid_zone(s));
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Zone::Fixed)
            .ok_or_else(|| invalid_zone(s))
    }

    /// Wall-clock time of `now` in this zone.
    pub fn wall_clock<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDateTime {
        match self {
            Zone::Local => now.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => now.with_timezone(offset).naive_local(),
        }
    }

    /// `now` in this zone, floored to the bucket grid.
    pub fn reference_time(&self, now: &DateTime<Utc>, step_minutes: u32) -> NaiveDateTime {
        match self {
            Zone::Local => reference_time(now, &Local, step_minutes),
            Zone::Fixed(offset) => reference_time(now, offset, step_minutes),
        }
    }
}

fn invalid_zone(s: &str) -> anyhow::Error {
    anyhow::anyhow!("invalid time zone '{}': expected \"local\" or an offset like \"+03:00\"", s)
}
