//! Ordered departure lists.

use serde::Serialize;

use super::time::{TimeError, TimeOfDay};

/// An entry that could not be read as a departure time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Position of the entry in the source list.
    pub index: usize,
    /// The raw entry text.
    pub text: String,
    /// Why it was rejected.
    pub error: TimeError,
}

/// Departure times for one route and day type, in stored order.
///
/// Source data is expected to be sorted already; the order is kept exactly
/// as given. An empty timetable means there is no service that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timetable(Vec<TimeOfDay>);

impl Timetable {
    /// Create a timetable from departure times.
    pub fn new(times: Vec<TimeOfDay>) -> Self {
        Self(times)
    }

    /// Parse "HH:MM" entries, keeping every valid one and reporting the rest.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_publisher::domain::Timetable;
    ///
    /// let (timetable, rejected) = Timetable::parse_entries(["06:00", "6:30", "07:00"]);
    /// assert_eq!(timetable.len(), 2);
    /// assert_eq!(rejected[0].text, "6:30");
    /// ```
    pub fn parse_entries<'a>(
        entries: impl IntoIterator<Item = &'a str>,
    ) -> (Self, Vec<RejectedEntry>) {
        let mut times = Vec::new();
        let mut rejected = Vec::new();

        for (index, text) in entries.into_iter().enumerate() {
            match TimeOfDay::parse_hhmm(text) {
                Ok(time) => times.push(time),
                Err(error) => rejected.push(RejectedEntry {
                    index,
                    text: text.to_string(),
                    error,
                }),
            }
        }

        (Self(times), rejected)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<TimeOfDay> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<TimeOfDay> {
        self.0.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<TimeOfDay> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        self.0.iter().copied()
    }

    /// Comma-separated "HH:MM" list, as published for whole-day timetables.
    pub fn to_payload(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<TimeOfDay> for Timetable {
    fn from_iter<I: IntoIterator<Item = TimeOfDay>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order() {
        let (timetable, rejected) = Timetable::parse_entries(["08:15", "07:00", "07:30"]);
        assert!(rejected.is_empty());
        let shown: Vec<String> = timetable.iter().map(|t| t.to_string()).collect();
        assert_eq!(shown, ["08:15", "07:00", "07:30"]);
    }

    #[test]
    fn parse_reports_malformed_entries() {
        let (timetable, rejected) =
            Timetable::parse_entries(["05:10", "25:00", "", "05:40", "ab:cd"]);

        assert_eq!(timetable.len(), 2);
        assert_eq!(rejected.len(), 3);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].text, "25:00");
        assert_eq!(rejected[1].index, 2);
        assert_eq!(rejected[2].text, "ab:cd");
    }

    #[test]
    fn accessors() {
        let (timetable, _) = Timetable::parse_entries(["06:00", "06:30", "07:00"]);
        assert_eq!(timetable.first().unwrap().to_string(), "06:00");
        assert_eq!(timetable.last().unwrap().to_string(), "07:00");
        assert_eq!(timetable.get(1).unwrap().to_string(), "06:30");
        assert!(timetable.get(3).is_none());

        let empty = Timetable::default();
        assert!(empty.is_empty());
        assert!(empty.first().is_none());
        assert!(empty.last().is_none());
    }

    #[test]
    fn payload_is_comma_joined() {
        let (timetable, _) = Timetable::parse_entries(["06:00", "06:30"]);
        assert_eq!(timetable.to_payload(), "06:00,06:30");
        assert_eq!(Timetable::default().to_payload(), "");
    }

    #[test]
    fn serializes_as_string_array() {
        let (timetable, _) = Timetable::parse_entries(["06:00", "06:30"]);
        assert_eq!(
            serde_json::to_string(&timetable).unwrap(),
            r#"["06:00","06:30"]"#
        );
    }
}
