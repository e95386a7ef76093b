//! Per-weekday opening hours.
//!
//! Some venue records carry a full week of hours instead of a single
//! `opens_at`/`closes_at` pair. A range that closes after midnight belongs
//! to the day it opens: Friday 22:00-02:00 is still open early Saturday.
//!
//! ## Accepted shapes
//!
//! - Day keys: names (`"monday"`, `"Monday"`) or indices `"0"`-`"6"` with
//!   Sunday as `0`
//! - Day values: `null`, `[]`, a list of `{"open", "close"}` objects or
//!   `[open, close]` pairs, a single object, or a single pair
//!
//! Unknown keys and unreadable values are skipped, so one bad entry closes
//! that day at worst.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::hours::{lenient_string, OpeningWindow, TimeOfDay, WindowKind};
use crate::open_now::OpenStatus;

/// Marker some data sources use instead of a time.
const CLOSED_MARKER: &str = "closed";

/// Closing time treated as "through the end of the day".
const END_OF_DAY: TimeOfDay = TimeOfDay {
    hour: 23,
    minute: 59,
};

/// Days of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    #[serde(alias = "Monday")]
    Monday,
    #[serde(alias = "Tuesday")]
    Tuesday,
    #[serde(alias = "Wednesday")]
    Wednesday,
    #[serde(alias = "Thursday")]
    Thursday,
    #[serde(alias = "Friday")]
    Friday,
    #[serde(alias = "Saturday")]
    Saturday,
    #[serde(alias = "Sunday")]
    Sunday,
}

impl Weekday {
    /// Returns all days of the week.
    pub fn all() -> [Weekday; 7] {
        [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ]
    }

    /// Returns the day for a Sunday-based index (0 = Sunday, 6 = Saturday).
    pub fn from_sunday_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Weekday::Sunday),
            1 => Some(Weekday::Monday),
            2 => Some(Weekday::Tuesday),
            3 => Some(Weekday::Wednesday),
            4 => Some(Weekday::Thursday),
            5 => Some(Weekday::Friday),
            6 => Some(Weekday::Saturday),
            _ => None,
        }
    }

    /// Lowercase English name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Parses a schedule key: a day name in any case, or a Sunday-based
    /// index.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Ok(index) = key.parse::<u8>() {
            return Self::from_sunday_index(index);
        }
        Self::all()
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(key))
    }

    /// Converts from chrono's Weekday.
    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    /// Returns the previous day of the week.
    pub fn previous(self) -> Weekday {
        match self {
            Weekday::Monday => Weekday::Sunday,
            Weekday::Tuesday => Weekday::Monday,
            Weekday::Wednesday => Weekday::Tuesday,
            Weekday::Thursday => Weekday::Wednesday,
            Weekday::Friday => Weekday::Thursday,
            Weekday::Saturday => Weekday::Friday,
            Weekday::Sunday => Weekday::Saturday,
        }
    }
}

/// One opening range as published, e.g. `{"open": "08:00", "close": "22:00"}`.
///
/// Times stay raw so a single bad entry only closes that range. A missing,
/// `null` or non-string time is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursRange {
    /// Opening time, `"HH:MM"` or `"Closed"`.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub open: Option<String>,
    /// Closing time, `"HH:MM"` or `"Closed"`.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub close: Option<String>,
}

impl HoursRange {
    /// Creates a range from raw strings.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: Some(open.into()),
            close: Some(close.into()),
        }
    }

    /// Reads a range from an object or an `[open, close]` pair.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            Value::Array(pair) if pair.len() == 2 => Some(Self {
                open: pair[0].as_str().map(String::from),
                close: pair[1].as_str().map(String::from),
            }),
            other => {
                tracing::debug!("Ignoring unreadable hours range {}", other);
                None
            }
        }
    }

    /// Parsed window. Ranges marked closed or missing a time have no times.
    pub fn window(&self) -> OpeningWindow {
        let (Some(open), Some(close)) = (self.open.as_deref(), self.close.as_deref()) else {
            return OpeningWindow::default();
        };
        if is_closed_marker(open) || is_closed_marker(close) {
            return OpeningWindow::default();
        }
        OpeningWindow::parse(Some(open), Some(close))
    }

    /// Checks the part of the range on the day it opens.
    pub fn covers_opening_day(&self, time: TimeOfDay) -> bool {
        let window = self.window();
        let (Some(opens), Some(closes)) = (window.opens, window.closes) else {
            return false;
        };
        match window.kind() {
            WindowKind::Missing | WindowKind::Degenerate => false,
            WindowKind::Overnight => time >= opens,
            WindowKind::SameDay if closes == END_OF_DAY => time >= opens,
            WindowKind::SameDay => window.contains(time),
        }
    }

    /// Checks the part of an overnight range that spills into the next day.
    pub fn covers_following_day(&self, time: TimeOfDay) -> bool {
        let window = self.window();
        match (window.kind(), window.closes) {
            (WindowKind::Overnight, Some(closes)) => time < closes,
            _ => false,
        }
    }
}

fn is_closed_marker(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(CLOSED_MARKER)
}

/// Reads one day's value. `None` and an empty list both mean closed.
fn day_ranges(value: Value) -> Option<Vec<HoursRange>> {
    match value {
        Value::Null => None,
        // A bare `[open, close]` pair is a single range.
        Value::Array(items) if items.len() == 2 && items.iter().all(is_time_slot) => {
            HoursRange::from_json(Value::Array(items)).map(|range| vec![range])
        }
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(HoursRange::from_json)
                .collect(),
        ),
        Value::Object(_) => HoursRange::from_json(value).map(|range| vec![range]),
        other => {
            tracing::debug!("Ignoring unreadable day hours {}", other);
            None
        }
    }
}

fn is_time_slot(value: &Value) -> bool {
    value.is_string() || value.is_null()
}

/// Opening ranges for each day. A missing day, `null`, or an empty list
/// means closed that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeeklyHours {
    /// Ranges keyed by the day they open.
    pub days: HashMap<Weekday, Option<Vec<HoursRange>>>,
}

impl<'de> Deserialize<'de> for WeeklyHours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_json(Value::deserialize(deserializer)?))
    }
}

impl WeeklyHours {
    /// Builds a schedule from loosely shaped JSON. Never fails; anything
    /// unreadable is skipped.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(entries) = value else {
            tracing::debug!("Ignoring weekly hours that are not an object: {}", value);
            return Self::default();
        };

        let mut hours = Self::new();
        for (key, value) in entries {
            match Weekday::from_key(&key) {
                Some(day) => {
                    hours.days.insert(day, day_ranges(value));
                }
                None => tracing::debug!("Ignoring unknown weekday key {:?}", key),
            }
        }
        hours
    }

    /// Creates an empty schedule (closed every day).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a range opening on `day`.
    pub fn add_range(&mut self, day: Weekday, range: HoursRange) {
        self.days
            .entry(day)
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(range);
    }

    /// Builder form of [`WeeklyHours::add_range`].
    pub fn with_range(mut self, day: Weekday, open: &str, close: &str) -> Self {
        self.add_range(day, HoursRange::new(open, close));
        self
    }

    /// Ranges opening on `day`.
    pub fn ranges(&self, day: Weekday) -> &[HoursRange] {
        self.days
            .get(&day)
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    /// Evaluates the schedule at a local day and time.
    ///
    /// Today's ranges are checked first, then overnight ranges that opened
    /// the previous day.
    pub fn status(&self, day: Weekday, time: TimeOfDay) -> OpenStatus {
        let today = self
            .ranges(day)
            .iter()
            .find(|range| range.covers_opening_day(time));
        let spillover = || {
            self.ranges(day.previous())
                .iter()
                .find(|range| range.covers_following_day(time))
        };

        today
            .or_else(spillover)
            .and_then(|range| range.window().closes)
            .map_or_else(OpenStatus::closed, OpenStatus::open_until)
    }

    /// Evaluates the schedule at a zone-local instant.
    pub fn status_at<Tz: TimeZone>(&self, local: &DateTime<Tz>) -> OpenStatus {
        let day = Weekday::from_chrono(local.weekday());
        self.status(day, TimeOfDay::from_naive_time(local.time()))
    }
}
