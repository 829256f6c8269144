//! Time-of-day handling for timetable entries.
//!
//! Timetable pages list departures as "HH:MM" strings with no date attached.
//! This module provides a minute-resolution time type and the remaining-time
//! arithmetic used for departure boards: a departure that is earlier in the
//! day than "now" belongs to the next calendar day, so the difference wraps
//! at midnight.

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time with minute resolution, in the range 00:00 to 23:59.
///
/// There is no date or timezone: a `TimeOfDay` is a point on the local
/// 24-hour dial.
///
/// # Examples
///
/// ```
/// use timetable_publisher::domain::TimeOfDay;
///
/// let time = TimeOfDay::parse_hhmm("07:05").unwrap();
/// assert_eq!(time.hour(), 7);
/// assert_eq!(time.minute(), 5);
/// assert_eq!(time.to_string(), "07:05");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Parse a time from zero-padded "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_publisher::domain::TimeOfDay;
    ///
    /// // Valid times
    /// assert!(TimeOfDay::parse_hhmm("00:00").is_ok());
    /// assert!(TimeOfDay::parse_hhmm("23:59").is_ok());
    ///
    /// // Invalid formats
    /// assert!(TimeOfDay::parse_hhmm("7:05").is_err());
    /// assert!(TimeOfDay::parse_hhmm("0705").is_err());
    /// assert!(TimeOfDay::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::from_hm(hour, minute)
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Returns the time as a `NaiveTime` with zero seconds.
    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }

    /// Whether this time is at or after the given wall-clock reading.
    pub fn is_at_or_after(&self, now: NaiveTime) -> bool {
        self.0 >= now
    }

    /// Whether this time is strictly before the given wall-clock reading.
    pub fn is_before(&self, now: NaiveTime) -> bool {
        self.0 < now
    }

    /// Whole minutes from `now` until this time, truncated toward zero.
    ///
    /// A time earlier than `now` is taken to be on the next day, so the
    /// result is always in `0..1440`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_publisher::domain::TimeOfDay;
    /// use chrono::NaiveTime;
    ///
    /// let departure = TimeOfDay::parse_hhmm("00:10").unwrap();
    /// let now = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
    /// assert_eq!(departure.minutes_until(now), 20);
    /// ```
    pub fn minutes_until(&self, now: NaiveTime) -> u32 {
        let mut delta = self.0.signed_duration_since(now);
        if delta < Duration::zero() {
            delta = delta + Duration::days(1);
        }
        // delta is in [0, 24h) here, so the conversion cannot fail
        u32::try_from(delta.num_minutes()).unwrap_or(0)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
