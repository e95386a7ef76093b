//! Open-now report for DoggoNow venues.
//!
//! Loads a venue JSON file and prints each venue's open/closed status at
//! the current instant (or at `--at`).

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use doggo_core::distance::{haversine_miles, Coordinates};
use doggo_core::{load_venues, EvaluatorConfig, OpenNowEvaluator, OpenStatus, Venue};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "open-now", version, about = "Show which DoggoNow venues are open")]
struct Args {
    /// Venue JSON file (array of venue records).
    #[arg(short, long)]
    venues: PathBuf,

    /// Evaluator config JSON file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default time zone, overrides config and environment.
    #[arg(long)]
    time_zone: Option<String>,

    /// Instant to evaluate (RFC 3339). Defaults to now.
    #[arg(long)]
    at: Option<DateTime<FixedOffset>>,

    /// Only list venues that are open.
    #[arg(long)]
    open_only: bool,

    /// Sort by distance from LAT,LNG.
    #[arg(long, allow_hyphen_values = true)]
    near: Option<Coordinates>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// One line of the report.
#[derive(Debug)]
struct Row<'a> {
    venue: &'a Venue,
    status: OpenStatus,
    miles: Option<f64>,
}

impl Row<'_> {
    fn render(&self) -> String {
        let mut line = format!("{:<32} {}", self.venue.name, self.status.label());
        if let Some(closes_at) = self.status.closes_at {
            line.push_str(&format!(" until {closes_at}"));
        }
        if let Some(miles) = self.miles {
            line.push_str(&format!(" ({miles:.1} mi)"));
        }
        line
    }
}

fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "doggo_core={log_level},open_now={log_level},warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_evaluator(args: &Args) -> Result<OpenNowEvaluator> {
    let mut config = match &args.config {
        Some(path) => EvaluatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvaluatorConfig::default(),
    };
    config.apply_env();
    if let Some(zone) = &args.time_zone {
        config.default_time_zone = zone.clone();
    }

    OpenNowEvaluator::from_config(&config).context("Invalid evaluator config")
}

fn build_rows<'a>(
    venues: &'a [Venue],
    evaluator: &OpenNowEvaluator,
    now: DateTime<Utc>,
    near: Option<Coordinates>,
    open_only: bool,
) -> Vec<Row<'a>> {
    let mut rows: Vec<Row<'a>> = venues
        .iter()
        .map(|venue| Row {
            venue,
            status: venue.open_status(evaluator, now),
            miles: near.zip(venue.coordinates()).map(|(a, b)| haversine_miles(a, b)),
        })
        .filter(|row| !open_only || row.status.open)
        .collect();

    if near.is_some() {
        // Venues without coordinates go last.
        rows.sort_by(|a, b| {
            a.miles
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.miles.unwrap_or(f64::INFINITY))
        });
    }
    rows
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let evaluator = build_evaluator(&args)?;
    let venues = load_venues(&args.venues)
        .with_context(|| format!("Failed to load venues from {}", args.venues.display()))?;

    let now = args.at.map_or_else(Utc::now, |at| at.with_timezone(&Utc));
    tracing::debug!("Evaluating {} venues at {}", venues.len(), now);

    let rows = build_rows(&venues, &evaluator, now, args.near, args.open_only);
    for row in &rows {
        println!("{}", row.render());
    }
    tracing::info!(
        "{} of {} venues open",
        rows.iter().filter(|row| row.status.open).count(),
        venues.len()
    );

    Ok(())
}
