//! Day-type classification for timetables.

use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an unknown day-type label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day type: {0}")]
pub struct InvalidDayType(String);

/// Which timetable variant applies on a given day.
///
/// Day types are cyclically ordered Workday → Saturday → Sunday → Workday.
/// There is no holiday awareness: every Monday to Friday is a workday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayType {
    Workday,
    Saturday,
    Sunday,
}

impl DayType {
    /// All day types in cyclic order.
    pub const ALL: [DayType; 3] = [DayType::Workday, DayType::Saturday, DayType::Sunday];

    /// The day type that follows this one, wrapping Sunday back to Workday.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_publisher::domain::DayType;
    ///
    /// assert_eq!(DayType::Workday.next(), DayType::Saturday);
    /// assert_eq!(DayType::Sunday.next(), DayType::Workday);
    /// ```
    pub fn next(self) -> Self {
        match self {
            DayType::Workday => DayType::Saturday,
            DayType::Saturday => DayType::Sunday,
            DayType::Sunday => DayType::Workday,
        }
    }

    /// The day type of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }

    /// The day type of a weekday.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Workday,
        }
    }

    /// Lower-case label used in file names and entity names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Workday => "workday",
            DayType::Saturday => "saturday",
            DayType::Sunday => "sunday",
        }
    }

    /// Section heading used for this day type on schedule pages.
    pub fn heading(&self) -> &'static str {
        match self {
            DayType::Workday => "darbo diena",
            DayType::Saturday => "šeštadienis",
            DayType::Sunday => "sekmadienis",
        }
    }

    /// Recognise a schedule page section heading, ignoring case and
    /// surrounding whitespace.
    pub fn from_heading(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day_type| day_type.heading() == normalized)
    }
}

impl FromStr for DayType {
    type Err = InvalidDayType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day_type| day_type.as_str() == s)
            .ok_or_else(|| InvalidDayType(s.to_string()))
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_cycles_in_order() {
        assert_eq!(DayType::Workday.next(), DayType::Saturday);
        assert_eq!(DayType::Saturday.next(), DayType::Sunday);
        assert_eq!(DayType::Sunday.next(), DayType::Workday);
    }

    #[test]
    fn next_has_period_three() {
        for day_type in DayType::ALL {
            assert_eq!(day_type.next().next().next(), day_type);
            assert_ne!(day_type.next(), day_type);
        }
    }

    #[test]
    fn day_type_of_date() {
        // 2024-03-11 is a Monday
        assert_eq!(DayType::of(date(2024, 3, 11)), DayType::Workday);
        assert_eq!(DayType::of(date(2024, 3, 15)), DayType::Workday);
        assert_eq!(DayType::of(date(2024, 3, 16)), DayType::Saturday);
        assert_eq!(DayType::of(date(2024, 3, 17)), DayType::Sunday);
    }

    #[test]
    fn label_roundtrip() {
        for day_type in DayType::ALL {
            assert_eq!(day_type.as_str().parse::<DayType>().unwrap(), day_type);
        }
        assert!("holiday".parse::<DayType>().is_err());
        assert!("Workday".parse::<DayType>().is_err());
    }

    #[test]
    fn recognises_headings() {
        assert_eq!(DayType::from_heading("darbo diena"), Some(DayType::Workday));
        assert_eq!(DayType::from_heading(" Šeštadienis "), Some(DayType::Saturday));
        assert_eq!(DayType::from_heading("SEKMADIENIS"), Some(DayType::Sunday));
        assert_eq!(DayType::from_heading("07 15 45"), None);
    }
}
