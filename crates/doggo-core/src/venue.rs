//! Venue records as supplied by the directory's data source.
//!
//! Records arrive as a JSON array, either from the bundled static file or
//! exported from the remote venue table. Only the fields the evaluator and
//! the CLI need are modelled; unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::distance::Coordinates;
use crate::hours::lenient_string;
use crate::open_now::{EvaluationOptions, OpenNowEvaluator, OpenStatus};
use crate::weekly::WeeklyHours;

/// Errors raised while loading venue records.
#[derive(Debug, Error)]
pub enum VenueError {
    /// IO error reading the venue file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for venue operations.
pub type Result<T> = std::result::Result<T, VenueError>;

/// A dog-friendly venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Identifier. Numeric ids in the source are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    pub longitude: Option<f64>,
    /// Local opening time, `"HH:MM"`. Non-string values read as absent.
    #[serde(default, deserialize_with = "lenient_string")]
    pub opens_at: Option<String>,
    /// Local closing time, `"HH:MM"`. Non-string values read as absent.
    #[serde(default, deserialize_with = "lenient_string")]
    pub closes_at: Option<String>,
    /// Per-weekday hours. Takes precedence over `opens_at`/`closes_at`.
    #[serde(default, alias = "open_hours", skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeeklyHours>,
    #[serde(default)]
    pub always_open: bool,
    /// IANA zone of the venue. Defaults to the evaluator's zone.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_zone: Option<String>,
}

impl Venue {
    /// Creates a venue with a simple daily window.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        opens_at: Option<&str>,
        closes_at: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opens_at: opens_at.map(String::from),
            closes_at: closes_at.map(String::from),
            ..Self::default()
        }
    }

    /// Location, if both coordinates are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    /// Evaluation options for this venue.
    pub fn options(&self) -> EvaluationOptions<'_> {
        EvaluationOptions {
            time_zone: self.time_zone.as_deref(),
            id: Some(&self.id),
        }
    }

    /// Open status at `now`.
    ///
    /// Allowlisted and always-open venues are open without a closing time.
    /// Weekly hours, when present, replace the daily window.
    pub fn open_status(&self, evaluator: &OpenNowEvaluator, now: DateTime<Utc>) -> OpenStatus {
        let options = self.options();
        if evaluator.is_force_open(options.id) || self.always_open {
            return OpenStatus::open_indefinitely();
        }

        match &self.hours {
            Some(hours) => hours.status_at(&evaluator.local_datetime(&options, now)),
            None => evaluator.status_at(
                self.opens_at.as_deref(),
                self.closes_at.as_deref(),
                &options,
                now,
            ),
        }
    }

    /// Returns true if the venue is open right now.
    pub fn is_open_now(&self, evaluator: &OpenNowEvaluator) -> bool {
        self.open_status(evaluator, Utc::now()).open
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Parses a JSON array of venues.
pub fn parse_venues(json: &str) -> Result<Vec<Venue>> {
    Ok(serde_json::from_str(json)?)
}

/// Loads a JSON array of venues from a file.
pub fn load_venues(path: impl AsRef<Path>) -> Result<Vec<Venue>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let venues = parse_venues(&raw)?;
    tracing::info!("Loaded {} venues from {:?}", venues.len(), path.as_ref());
    Ok(venues)
}
