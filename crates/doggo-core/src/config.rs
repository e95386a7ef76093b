//! Deploy-time configuration for opening-hours evaluation.
//!
//! The evaluator needs two settings: the zone venues are assumed to be in
//! when a record carries none, and the set of venue ids that are always
//! reported open (demo and test venues).
//!
//! ## Sources
//!
//! 1. [`EvaluatorConfig::default`]: `America/Detroit`, empty allowlist
//! 2. A JSON file via [`EvaluatorConfig::load`]
//! 3. `DOGGO_TIME_ZONE` / `DOGGO_FORCE_OPEN` via [`EvaluatorConfig::apply_env`]

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Zone used when neither the venue nor the caller names one.
pub const DEFAULT_TIME_ZONE: &str = "America/Detroit";

/// Environment variable overriding the default zone.
pub const TIME_ZONE_ENV: &str = "DOGGO_TIME_ZONE";

/// Environment variable holding a comma separated force-open allowlist.
pub const FORCE_OPEN_ENV: &str = "DOGGO_FORCE_OPEN";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured default zone is not a known IANA identifier.
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Evaluator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// IANA zone used when a call does not name one.
    pub default_time_zone: String,
    /// Venue ids that are always reported open.
    pub force_open: Vec<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            default_time_zone: DEFAULT_TIME_ZONE.to_string(),
            force_open: Vec::new(),
        }
    }
}

impl EvaluatorConfig {
    /// Reads a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        tracing::debug!("Loaded evaluator config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(TIME_ZONE_ENV).ok(),
            std::env::var(FORCE_OPEN_ENV).ok(),
        );
    }

    /// Applies explicit override values, as read from the environment.
    ///
    /// An empty zone is ignored. The allowlist replaces the current one.
    pub fn apply_overrides(&mut self, time_zone: Option<String>, force_open: Option<String>) {
        if let Some(zone) = time_zone.filter(|z| !z.trim().is_empty()) {
            self.default_time_zone = zone.trim().to_string();
        }
        if let Some(list) = force_open {
            self.force_open = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Adds an id to the force-open allowlist.
    pub fn with_force_open(mut self, id: impl Into<String>) -> Self {
        self.force_open.push(id.into());
        self
    }

    /// Sets the default zone.
    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.default_time_zone = zone.into();
        self
    }
}
