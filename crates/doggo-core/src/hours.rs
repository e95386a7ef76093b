//! Times of day and daily opening windows.
//!
//! A venue publishes its hours as a pair of local `"HH:MM"` strings. This
//! module parses them into [`TimeOfDay`] values and decides membership for
//! a single daily window, including windows that cross midnight.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Errors produced when parsing a time-of-day string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoursError {
    /// The input was empty or whitespace.
    #[error("time string is empty")]
    Empty,

    /// The input is not shaped like `HH:MM` or `HH:MM:SS`.
    #[error("invalid time format: {0:?}")]
    Format(String),

    /// Hour outside 0-23.
    #[error("hour must be 0-23, got {0}")]
    Hour(u8),

    /// Minute outside 0-59.
    #[error("minute must be 0-59, got {0}")]
    Minute(u8),

    /// Second outside 0-59.
    #[error("second must be 0-59, got {0}")]
    Second(u8),
}

/// Time of day represented as hour and minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay {
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
}

impl TimeOfDay {
    /// Midnight, the start of the day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    /// Creates a new TimeOfDay.
    ///
    /// # Panics
    /// Panics if hour >= 24 or minute >= 60.
    pub fn new(hour: u8, minute: u8) -> Self {
        assert!(hour < 24, "hour must be 0-23");
        assert!(minute < 60, "minute must be 0-59");
        Self { hour, minute }
    }

    /// Creates a TimeOfDay, returning `None` when out of range.
    pub fn try_new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Creates a TimeOfDay from hour only (minute = 0).
    pub fn from_hour(hour: u8) -> Self {
        Self::new(hour, 0)
    }

    /// Converts to minutes since midnight for comparison.
    pub fn to_minutes(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Creates from a chrono NaiveTime, dropping seconds.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    /// Parses `H:MM`, `HH:MM` or `HH:MM:SS`.
    ///
    /// Seconds are validated and then dropped. Surrounding whitespace is
    /// ignored.
    pub fn parse(input: &str) -> Result<Self, HoursError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(HoursError::Empty);
        }

        let format_err = || HoursError::Format(input.to_string());
        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hour, minute, second) = match parts.as_slice() {
            [h, m] => (*h, *m, None),
            [h, m, s] => (*h, *m, Some(*s)),
            _ => return Err(format_err()),
        };

        let hour = parse_field(hour, 1..=2).ok_or_else(format_err)?;
        let minute = parse_field(minute, 2..=2).ok_or_else(format_err)?;
        if let Some(second) = second {
            let second = parse_field(second, 2..=2).ok_or_else(format_err)?;
            if second >= 60 {
                return Err(HoursError::Second(second));
            }
        }

        if hour >= 24 {
            return Err(HoursError::Hour(hour));
        }
        if minute >= 60 {
            return Err(HoursError::Minute(minute));
        }
        Ok(Self { hour, minute })
    }
}

/// Parses an all-digit field whose length falls in `digits`.
fn parse_field(field: &str, digits: std::ops::RangeInclusive<usize>) -> Option<u8> {
    if !digits.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl PartialOrd for TimeOfDay {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeOfDay {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_minutes().cmp(&other.to_minutes())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Shape of an opening window, in the order it is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// One or both ends are absent or unparsable.
    Missing,
    /// Opens and closes at the same minute. Never open.
    Degenerate,
    /// Closes later the same day.
    SameDay,
    /// Closes the next calendar day.
    Overnight,
}

/// A daily opening window.
///
/// Either end may be absent; a window with a missing end is always closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpeningWindow {
    /// Opening time.
    pub opens: Option<TimeOfDay>,
    /// Closing time.
    pub closes: Option<TimeOfDay>,
}

impl OpeningWindow {
    /// Creates a window from two known times.
    pub fn new(opens: TimeOfDay, closes: TimeOfDay) -> Self {
        Self {
            opens: Some(opens),
            closes: Some(closes),
        }
    }

    /// Creates a window from hour values.
    pub fn from_hours(opens: u8, closes: u8) -> Self {
        Self::new(TimeOfDay::from_hour(opens), TimeOfDay::from_hour(closes))
    }

    /// Parses a window from raw venue fields.
    ///
    /// Never fails: a malformed side is treated as absent.
    pub fn parse(opens_at: Option<&str>, closes_at: Option<&str>) -> Self {
        Self {
            opens: opens_at.and_then(|raw| parse_lenient("opens_at", raw)),
            closes: closes_at.and_then(|raw| parse_lenient("closes_at", raw)),
        }
    }

    /// Classifies the window.
    pub fn kind(&self) -> WindowKind {
        match (self.opens, self.closes) {
            (Some(opens), Some(closes)) if opens == closes => WindowKind::Degenerate,
            (Some(opens), Some(closes)) if closes < opens => WindowKind::Overnight,
            (Some(_), Some(_)) => WindowKind::SameDay,
            _ => WindowKind::Missing,
        }
    }

    /// Returns true if this window crosses midnight.
    pub fn is_overnight(&self) -> bool {
        self.kind() == WindowKind::Overnight
    }

    /// Checks if a given time falls within this window.
    ///
    /// The opening minute is inside the window, the closing minute is not.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        let (Some(opens), Some(closes)) = (self.opens, self.closes) else {
            return false;
        };
        match self.kind() {
            WindowKind::Missing | WindowKind::Degenerate => false,
            // 20:00-02:00 is open if >= 20:00 OR < 02:00
            WindowKind::Overnight => time >= opens || time < closes,
            WindowKind::SameDay => time >= opens && time < closes,
        }
    }
}

/// Deserializes an optional string field, reading `null` or any non-string
/// value as absent so one odd field cannot reject a whole record.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => Some(text),
        None | Some(serde_json::Value::Null) => None,
        Some(other) => {
            tracing::debug!("Ignoring non-string time value {}", other);
            None
        }
    })
}

fn parse_lenient(field: &str, raw: &str) -> Option<TimeOfDay> {
    match TimeOfDay::parse(raw) {
        Ok(time) => Some(time),
        Err(err) => {
            tracing::debug!("Ignoring malformed {} {:?}: {}", field, raw, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay::new(hour, minute)
    }

    // ==================== TimeOfDay Tests ====================

    #[test]
    fn time_of_day_creation() {
        let time = TimeOfDay::new(14, 30);
        assert_eq!(time.hour, 14);
        assert_eq!(time.minute, 30);
    }

    #[test]
    #[should_panic(expected = "hour must be 0-23")]
    fn time_of_day_invalid_hour() {
        TimeOfDay::new(24, 0);
    }

    #[test]
    #[should_panic(expected = "minute must be 0-59")]
    fn time_of_day_invalid_minute() {
        TimeOfDay::new(12, 60);
    }

    #[test]
    fn time_of_day_try_new() {
        assert_eq!(TimeOfDay::try_new(23, 59), Some(t(23, 59)));
        assert_eq!(TimeOfDay::try_new(24, 0), None);
        assert_eq!(TimeOfDay::try_new(0, 60), None);
    }

    #[test]
    fn time_of_day_to_minutes() {
        assert_eq!(TimeOfDay::MIDNIGHT.to_minutes(), 0);
        assert_eq!(t(12, 30).to_minutes(), 750);
        assert_eq!(t(23, 59).to_minutes(), MINUTES_PER_DAY - 1);
    }

    #[test]
    fn time_of_day_parse_accepted_shapes() {
        assert_eq!(TimeOfDay::parse("09:00"), Ok(t(9, 0)));
        assert_eq!(TimeOfDay::parse("9:05"), Ok(t(9, 5)));
        assert_eq!(TimeOfDay::parse(" 22:15 "), Ok(t(22, 15)));
        assert_eq!(TimeOfDay::parse("08:00:00"), Ok(t(8, 0)));
        assert_eq!(TimeOfDay::parse("00:00"), Ok(TimeOfDay::MIDNIGHT));
    }

    #[test]
    fn time_of_day_parse_rejects_garbage() {
        assert_eq!(TimeOfDay::parse(""), Err(HoursError::Empty));
        assert_eq!(TimeOfDay::parse("   "), Err(HoursError::Empty));
        assert!(matches!(TimeOfDay::parse("9"), Err(HoursError::Format(_))));
        assert!(matches!(TimeOfDay::parse("Closed"), Err(HoursError::Format(_))));
        assert!(matches!(TimeOfDay::parse("9:5"), Err(HoursError::Format(_))));
        assert!(matches!(TimeOfDay::parse("-1:00"), Err(HoursError::Format(_))));
        assert!(matches!(TimeOfDay::parse("10:00pm"), Err(HoursError::Format(_))));
        assert!(matches!(TimeOfDay::parse("1:2:3:4"), Err(HoursError::Format(_))));
        assert_eq!(TimeOfDay::parse("24:00"), Err(HoursError::Hour(24)));
        assert_eq!(TimeOfDay::parse("12:60"), Err(HoursError::Minute(60)));
        assert_eq!(TimeOfDay::parse("12:00:61"), Err(HoursError::Second(61)));
    }

    #[test]
    fn time_of_day_display_pads() {
        assert_eq!(t(2, 5).to_string(), "02:05");
        assert_eq!("7:30".parse::<TimeOfDay>().unwrap().to_string(), "07:30");
    }

    #[test]
    fn time_of_day_serialization() {
        let json = serde_json::to_string(&t(18, 45)).unwrap();
        assert_eq!(json, "\"18:45\"");

        let parsed: TimeOfDay = serde_json::from_str("\"6:00\"").unwrap();
        assert_eq!(parsed, t(6, 0));

        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    // ==================== OpeningWindow Tests ====================

    #[test]
    fn window_kinds() {
        assert_eq!(OpeningWindow::from_hours(9, 17).kind(), WindowKind::SameDay);
        assert_eq!(OpeningWindow::from_hours(20, 2).kind(), WindowKind::Overnight);
        assert_eq!(OpeningWindow::from_hours(10, 10).kind(), WindowKind::Degenerate);
        assert_eq!(OpeningWindow::default().kind(), WindowKind::Missing);
        assert_eq!(
            OpeningWindow::parse(Some("09:00"), None).kind(),
            WindowKind::Missing
        );
    }

    #[test]
    fn window_parse_degrades_malformed_side() {
        let window = OpeningWindow::parse(Some("nine"), Some("17:00"));
        assert_eq!(window.opens, None);
        assert_eq!(window.closes, Some(t(17, 0)));
        assert!(!window.contains(t(12, 0)));
    }

    #[test]
    fn window_contains_same_day() {
        let window = OpeningWindow::from_hours(9, 17);

        assert!(!window.contains(t(8, 59)));
        assert!(window.contains(t(9, 0))); // opening minute is open
        assert!(window.contains(t(16, 59)));
        assert!(!window.contains(t(17, 0))); // closing minute is closed
        assert!(!window.contains(t(23, 0)));
    }

    #[test]
    fn window_contains_overnight() {
        let window = OpeningWindow::from_hours(20, 2);

        assert!(!window.contains(t(19, 59)));
        assert!(window.contains(t(20, 0)));
        assert!(window.contains(t(23, 30)));
        assert!(window.contains(TimeOfDay::MIDNIGHT));
        assert!(window.contains(t(1, 30)));
        assert!(window.contains(t(1, 59)));
        assert!(!window.contains(t(2, 0)));
        assert!(!window.contains(t(12, 0)));
    }

    #[test]
    fn window_overnight_to_midnight() {
        // Closing at 00:00 is the overnight branch with an empty next-day part.
        let window = OpeningWindow::new(t(18, 0), TimeOfDay::MIDNIGHT);
        assert!(window.is_overnight());
        assert!(window.contains(t(23, 59)));
        assert!(!window.contains(TimeOfDay::MIDNIGHT));
        assert!(!window.contains(t(17, 59)));
    }

    #[test]
    fn window_degenerate_never_open() {
        let window = OpeningWindow::from_hours(10, 10);
        for minute in 0..MINUTES_PER_DAY {
            let time = t((minute / 60) as u8, (minute % 60) as u8);
            assert!(!window.contains(time), "open at {time}");
        }
    }
}
