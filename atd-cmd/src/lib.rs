//! Command implementations for the taxi demand CLI.
//!
//! Provides subcommands for producing the demand chart, importing ride
//! and forecast data, and recording user feedback.

use clap::Subcommand;

pub mod feedback;
pub mod forecast;
pub mod import;
pub mod settings;

#[derive(Subcommand)]
pub enum Command {
    /// Produce the demand chart description as JSON
    Forecast {
        /// Settings file (defaults to ./atd.toml when present)
        #[arg(short, long)]
        config: Option<String>,

        /// Reference time "YYYY-MM-DD HH:MM" instead of now
        #[arg(long)]
        at: Option<String>,

        /// Output path for the chart JSON (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import ride counts and optionally a new forecast from CSV files
    Import {
        /// Settings file (defaults to ./atd.toml when present)
        #[arg(short, long)]
        config: Option<String>,

        /// Rides CSV: date,time,category_1..category_4
        #[arg(short, long)]
        rides: String,

        /// Forecast CSV: timestamp,value (replaces the stored forecast)
        #[arg(short, long)]
        forecast: Option<String>,
    },

    /// Record user feedback
    Feedback {
        /// Settings file (defaults to ./atd.toml when present)
        #[arg(short, long)]
        config: Option<String>,

        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Free text, at most 256 characters
        #[arg(long)]
        comment: String,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Forecast { config, at, output } => {
            forecast::run_forecast_command(config.as_deref(), at.as_deref(), output.as_deref())
        }
        Command::Import {
            config,
            rides,
            forecast,
        } => import::run_import(config.as_deref(), &rides, forecast.as_deref()),
        Command::Feedback {
            config,
            rating,
            comment,
        } => feedback::run_feedback(config.as_deref(), rating, &comment),
    }
}
