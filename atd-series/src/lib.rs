//! Airport taxi demand series.
//!
//! Turns stored ride counts and a precomputed forecast into the data
//! behind the demand chart:
//!
//! - [`loader`] rebuilds the observed 15 minute series, removing outliers
//!   and filling gaps ([`repair`]);
//! - [`segments`] finds the busy intervals of the forecast;
//! - [`merge`] joins observed and forecast at the reference time;
//! - [`chart`] describes the result for a renderer.
//!
//! [`pipeline::run_forecast`] runs all of them in order. Storage is
//! reached only through the traits in [`source`].

pub mod chart;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod repair;
pub mod segments;
pub mod smoother;
pub mod source;

pub use chart::ChartSpec;
pub use config::PipelineConfig;
pub use error::{Result, SeriesError};
pub use model::{DemandLevel, DemandPoint, DemandSeries, FeedbackRecord, RawRideRow, Segment};
pub use pipeline::{run_forecast, run_forecast_from, Forecast};
pub use source::{FeedbackSink, ForecastSource, RideSource};
