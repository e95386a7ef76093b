//! "Open now" evaluation for a single venue at a single instant.
//!
//! ## Evaluation Order
//!
//! 1. Force-open allowlist - if the venue id is listed, it is open
//! 2. Missing or unparsable times - closed
//! 3. Degenerate window (opens == closes) - closed
//! 4. Same-day or overnight window, checked against the wall clock in the
//!    venue's zone
//!
//! Nothing here returns an error. Bad input resolves to closed, and an
//! unknown zone falls back to the default zone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{self, ConfigError, EvaluatorConfig};
use crate::hours::{OpeningWindow, TimeOfDay};

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationOptions<'a> {
    /// IANA zone the opening times are expressed in.
    pub time_zone: Option<&'a str>,
    /// Venue id, checked against the force-open allowlist.
    pub id: Option<&'a str>,
}

impl<'a> EvaluationOptions<'a> {
    /// Options with neither zone nor id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zone.
    pub fn time_zone(mut self, time_zone: &'a str) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    /// Sets the venue id.
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

/// Result of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpenStatus {
    /// Whether the venue is open.
    pub open: bool,
    /// Local closing time of the window the venue is currently in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<TimeOfDay>,
}

impl OpenStatus {
    /// A closed status.
    pub fn closed() -> Self {
        Self::default()
    }

    /// An open status with a known closing time.
    pub fn open_until(closes_at: TimeOfDay) -> Self {
        Self {
            open: true,
            closes_at: Some(closes_at),
        }
    }

    /// An open status with no closing time (allowlisted or 24/7).
    pub fn open_indefinitely() -> Self {
        Self {
            open: true,
            closes_at: None,
        }
    }

    /// Badge text for this status.
    pub fn label(&self) -> &'static str {
        if self.open {
            "Open now"
        } else {
            "Closed"
        }
    }
}

/// Decides whether venues are open.
///
/// Holds only immutable configuration, so one instance can be shared
/// across threads and calls.
#[derive(Debug, Clone)]
pub struct OpenNowEvaluator {
    default_zone: Tz,
    force_open: HashSet<String>,
}

impl Default for OpenNowEvaluator {
    fn default() -> Self {
        Self::new(chrono_tz::America::Detroit, Vec::<String>::new())
    }
}

impl OpenNowEvaluator {
    /// Creates an evaluator from a default zone and a force-open allowlist.
    pub fn new<I, S>(default_zone: Tz, force_open: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_zone,
            force_open: force_open.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an evaluator from loaded configuration.
    ///
    /// Fails if the default zone is unknown, since the per-call fallback
    /// depends on it.
    pub fn from_config(config: &EvaluatorConfig) -> config::Result<Self> {
        let zone: Tz = config
            .default_time_zone
            .parse()
            .map_err(|_| ConfigError::UnknownTimeZone(config.default_time_zone.clone()))?;
        Ok(Self::new(zone, config.force_open.iter().cloned()))
    }

    /// Returns the default zone.
    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    /// Returns true if `id` is on the force-open allowlist.
    pub fn is_force_open(&self, id: Option<&str>) -> bool {
        id.is_some_and(|id| self.force_open.contains(id))
    }

    /// Resolves a zone name, falling back to the default zone.
    pub fn resolve_zone(&self, name: Option<&str>) -> Tz {
        let Some(name) = name else {
            return self.default_zone;
        };
        match name.parse::<Tz>() {
            Ok(zone) => zone,
            Err(_) => {
                tracing::warn!(
                    "Unknown time zone {:?}, falling back to {}",
                    name,
                    self.default_zone.name()
                );
                self.default_zone
            }
        }
    }

    /// Converts `now` to the wall clock of the resolved zone.
    pub fn local_datetime(
        &self,
        options: &EvaluationOptions<'_>,
        now: DateTime<Utc>,
    ) -> DateTime<Tz> {
        now.with_timezone(&self.resolve_zone(options.time_zone))
    }

    /// Local hour and minute of `now` in the resolved zone.
    pub fn local_time(&self, options: &EvaluationOptions<'_>, now: DateTime<Utc>) -> TimeOfDay {
        TimeOfDay::from_naive_time(self.local_datetime(options, now).time())
    }

    /// Evaluates an already parsed window.
    pub fn window_status(
        &self,
        window: &OpeningWindow,
        options: &EvaluationOptions<'_>,
        now: DateTime<Utc>,
    ) -> OpenStatus {
        if self.is_force_open(options.id) {
            return OpenStatus::open_indefinitely();
        }

        let time = self.local_time(options, now);
        match window.closes {
            Some(closes) if window.contains(time) => OpenStatus::open_until(closes),
            _ => OpenStatus::closed(),
        }
    }

    /// Evaluates raw `opens_at`/`closes_at` strings at `now`.
    pub fn status_at(
        &self,
        opens_at: Option<&str>,
        closes_at: Option<&str>,
        options: &EvaluationOptions<'_>,
        now: DateTime<Utc>,
    ) -> OpenStatus {
        let window = OpeningWindow::parse(opens_at, closes_at);
        self.window_status(&window, options, now)
    }

    /// Returns true if the venue is open at `now`.
    pub fn is_open_at(
        &self,
        opens_at: Option<&str>,
        closes_at: Option<&str>,
        options: &EvaluationOptions<'_>,
        now: DateTime<Utc>,
    ) -> bool {
        self.status_at(opens_at, closes_at, options, now).open
    }

    /// Returns true if the venue is open right now.
    pub fn is_open_now(
        &self,
        opens_at: Option<&str>,
        closes_at: Option<&str>,
        options: &EvaluationOptions<'_>,
    ) -> bool {
        self.is_open_at(opens_at, closes_at, options, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::{Detroit, Los_Angeles};

    /// A UTC instant that reads `hour:minute` on a Detroit wall clock.
    fn detroit(hour: u32, minute: u32) -> DateTime<Utc> {
        Detroit
            .with_ymd_and_hms(2024, 1, 15, hour, minute, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn open(opens: Option<&str>, closes: Option<&str>, hour: u32, minute: u32) -> bool {
        OpenNowEvaluator::default().is_open_at(
            opens,
            closes,
            &EvaluationOptions::new(),
            detroit(hour, minute),
        )
    }

    // ==================== Window Tests ====================

    #[test]
    fn same_day_window() {
        let (o, c) = (Some("09:00"), Some("17:00"));
        assert!(!open(o, c, 8, 59));
        assert!(open(o, c, 9, 0));
        assert!(open(o, c, 16, 59));
        assert!(!open(o, c, 17, 0));
    }

    #[test]
    fn overnight_window() {
        let (o, c) = (Some("20:00"), Some("02:00"));
        assert!(open(o, c, 23, 30));
        assert!(open(o, c, 1, 30));
        assert!(open(o, c, 20, 0));
        assert!(!open(o, c, 2, 0));
        assert!(!open(o, c, 12, 0));
    }

    #[test]
    fn degenerate_window_is_closed() {
        let (o, c) = (Some("10:00"), Some("10:00"));
        assert!(!open(o, c, 10, 0));
        assert!(!open(o, c, 9, 59));
        assert!(!open(o, c, 10, 1));
        assert!(!open(o, c, 22, 0));
    }

    #[test]
    fn missing_times_are_closed() {
        for hour in 0..24 {
            assert!(!open(None, Some("17:00"), hour, 0));
            assert!(!open(Some("09:00"), None, hour, 0));
            assert!(!open(None, None, hour, 0));
        }
    }

    #[test]
    fn malformed_times_are_closed() {
        assert!(!open(Some("9am"), Some("17:00"), 12, 0));
        assert!(!open(Some("09:00"), Some("25:00"), 12, 0));
        assert!(!open(Some(""), Some(""), 12, 0));
    }

    #[test]
    fn status_carries_closing_time() {
        let evaluator = OpenNowEvaluator::default();
        let options = EvaluationOptions::new();

        let status = evaluator.status_at(Some("20:00"), Some("2:00"), &options, detroit(23, 0));
        assert_eq!(status, OpenStatus::open_until(TimeOfDay::new(2, 0)));
        assert_eq!(status.label(), "Open now");

        let status = evaluator.status_at(Some("20:00"), Some("2:00"), &options, detroit(3, 0));
        assert_eq!(status, OpenStatus::closed());
        assert_eq!(status.label(), "Closed");
    }

    // ==================== Allowlist Tests ====================

    #[test]
    fn allowlisted_venue_is_always_open() {
        let evaluator = OpenNowEvaluator::new(Detroit, ["demo"]);
        let options = EvaluationOptions::new().id("demo");

        for hour in 0..24 {
            let status = evaluator.status_at(None, None, &options, detroit(hour, 0));
            assert_eq!(status, OpenStatus::open_indefinitely());
        }
        assert!(evaluator.is_open_at(Some("10:00"), Some("10:00"), &options, detroit(3, 0)));
    }

    #[test]
    fn unlisted_id_gets_normal_evaluation() {
        let evaluator = OpenNowEvaluator::new(Detroit, ["demo"]);
        let options = EvaluationOptions::new().id("other");
        assert!(!evaluator.is_open_at(None, None, &options, detroit(12, 0)));
        assert!(!evaluator.is_force_open(None));
    }

    // ==================== Time Zone Tests ====================

    #[test]
    fn same_instant_differs_by_zone() {
        let evaluator = OpenNowEvaluator::default();
        // 17:30 in Detroit, 14:30 in Los Angeles
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 21, 30, 0).unwrap();
        let (o, c) = (Some("09:00"), Some("17:00"));

        let in_detroit = EvaluationOptions::new().time_zone("America/Detroit");
        let in_la = EvaluationOptions::new().time_zone("America/Los_Angeles");

        assert!(!evaluator.is_open_at(o, c, &in_detroit, now));
        assert!(evaluator.is_open_at(o, c, &in_la, now));
    }

    #[test]
    fn local_time_uses_zone_not_utc() {
        let evaluator = OpenNowEvaluator::new(Los_Angeles, Vec::<String>::new());
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 8, 15, 0).unwrap();

        assert_eq!(
            evaluator.local_time(&EvaluationOptions::new(), now),
            TimeOfDay::new(0, 15)
        );
        assert_eq!(
            evaluator.local_time(&EvaluationOptions::new().time_zone("UTC"), now),
            TimeOfDay::new(8, 15)
        );
    }

    #[test]
    fn unknown_zone_falls_back_to_default() {
        let evaluator = OpenNowEvaluator::default();
        assert_eq!(evaluator.resolve_zone(Some("Mars/Olympus_Mons")), Detroit);
        assert_eq!(evaluator.resolve_zone(None), Detroit);

        let options = EvaluationOptions::new().time_zone("not a zone");
        assert!(evaluator.is_open_at(Some("09:00"), Some("17:00"), &options, detroit(12, 0)));
    }

    // ==================== Config Tests ====================

    #[test]
    fn from_config_builds_allowlist_and_zone() {
        let config = EvaluatorConfig::default()
            .with_time_zone("America/Los_Angeles")
            .with_force_open("demo");
        let evaluator = OpenNowEvaluator::from_config(&config).unwrap();

        assert_eq!(evaluator.default_zone(), Los_Angeles);
        assert!(evaluator.is_force_open(Some("demo")));
    }

    #[test]
    fn from_config_rejects_unknown_default_zone() {
        let config = EvaluatorConfig::default().with_time_zone("Nowhere/Special");
        let err = OpenNowEvaluator::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTimeZone(zone) if zone == "Nowhere/Special"));
    }

    // ==================== Property Tests ====================

    #[test]
    fn evaluation_is_idempotent() {
        let evaluator = OpenNowEvaluator::new(Detroit, ["demo"]);
        let options = EvaluationOptions::new().id("x").time_zone("Europe/Berlin");
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap();

        let first = evaluator.status_at(Some("21:00"), Some("03:00"), &options, now);
        let second = evaluator.status_at(Some("21:00"), Some("03:00"), &options, now);
        assert_eq!(first, second);
    }

    #[test]
    fn boundaries_are_half_open_in_both_branches() {
        // Opening minute open, closing minute closed, whichever side of midnight.
        for (o, c) in [("06:30", "14:45"), ("22:10", "04:20")] {
            let window = OpeningWindow::parse(Some(o), Some(c));
            let (opens, closes) = (window.opens.unwrap(), window.closes.unwrap());
            assert!(open(Some(o), Some(c), opens.hour.into(), opens.minute.into()));
            assert!(!open(Some(o), Some(c), closes.hour.into(), closes.minute.into()));
        }
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_string(&OpenStatus::open_until(TimeOfDay::new(2, 0))).unwrap();
        assert_eq!(json, r#"{"open":true,"closes_at":"02:00"}"#);

        let json = serde_json::to_string(&OpenStatus::closed()).unwrap();
        assert_eq!(json, r#"{"open":false}"#);
    }
}
