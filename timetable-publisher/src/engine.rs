//! Current/next departure computation.
//!
//! Given today's timetable, the timetable of the next day type and the
//! current wall-clock time, work out which departure is "current" (the first
//! one not yet gone), which one follows it, and how many minutes remain until
//! each. Once the day's last departure has passed, the next day type's
//! timetable takes over entirely.
//!
//! Everything here is a pure function of its inputs.

use chrono::NaiveTime;

use crate::domain::{TimeOfDay, Timetable};

/// Entity name for the current departure time.
pub const CURRENT_DEPARTURE: &str = "current_departure";
/// Entity name for minutes until the current departure.
pub const CURRENT_DEPARTURE_REMAINING: &str = "current_departure_remaining";
/// Entity name for the following departure time.
pub const NEXT_DEPARTURE: &str = "next_departure";
/// Entity name for minutes until the following departure.
pub const NEXT_DEPARTURE_REMAINING: &str = "next_departure_remaining";

/// A departure time with the minutes remaining until it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub time: TimeOfDay,
    pub minutes_remaining: u32,
}

impl Departure {
    fn at(time: TimeOfDay, now: NaiveTime) -> Self {
        Self {
            time,
            minutes_remaining: time.minutes_until(now),
        }
    }
}

/// Current and next departure for one route at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureResult {
    pub current: Departure,
    /// `None` when the following departure is on a day type whose
    /// timetable is unavailable.
    pub next: Option<Departure>,
}

impl DepartureResult {
    /// Entity/value pairs to publish, in publication order.
    pub fn entities(&self) -> Vec<(&'static str, String)> {
        let mut entities = vec![
            (CURRENT_DEPARTURE, self.current.time.to_string()),
            (
                CURRENT_DEPARTURE_REMAINING,
                self.current.minutes_remaining.to_string(),
            ),
        ];

        if let Some(next) = &self.next {
            entities.push((NEXT_DEPARTURE, next.time.to_string()));
            entities.push((NEXT_DEPARTURE_REMAINING, next.minutes_remaining.to_string()));
        }

        entities
    }
}

/// Compute the current and next departure.
///
/// * `today` - timetable of today's day type, in stored order
/// * `next_day` - timetable of the following day type, if one is stored
/// * `now` - current wall-clock time (seconds are honoured)
///
/// Returns `None` when there is nothing to report: today's timetable is
/// empty, or the day is over and the next day type has no departures.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use timetable_publisher::domain::Timetable;
/// use timetable_publisher::engine::compute_departures;
///
/// let (today, _) = Timetable::parse_entries(["07:00", "07:30", "08:15"]);
/// let now = NaiveTime::from_hms_opt(7, 10, 0).unwrap();
///
/// let result = compute_departures(&today, None, now).unwrap();
/// assert_eq!(result.current.time.to_string(), "07:30");
/// assert_eq!(result.current.minutes_remaining, 20);
/// assert_eq!(result.next.unwrap().time.to_string(), "08:15");
/// ```
pub fn compute_departures(
    today: &Timetable,
    next_day: Option<&Timetable>,
    now: NaiveTime,
) -> Option<DepartureResult> {
    let last = today.last()?;

    let (current, next) = if last.is_before(now) {
        rollover(next_day?)?
    } else {
        same_day(today, next_day, now)?
    };

    Some(DepartureResult {
        current: Departure::at(current, now),
        next: next.map(|time| Departure::at(time, now)),
    })
}

/// Pick current/next from today's timetable while departures remain.
fn same_day(
    today: &Timetable,
    next_day: Option<&Timetable>,
    now: NaiveTime,
) -> Option<(TimeOfDay, Option<TimeOfDay>)> {
    let index = today.iter().position(|time| time.is_at_or_after(now))?;
    let current = today.get(index)?;

    let next = match today.get(index + 1) {
        Some(time) => Some(time),
        // Last departure of the day: continue into the next day type
        None => next_day.map(|timetable| first_of_next_day(timetable, current)),
    };

    Some((current, next))
}

/// The departure following today's last one.
///
/// A next-day timetable with fewer than two departures is treated as too
/// sparse to be useful and the current departure is repeated.
fn first_of_next_day(next_day: &Timetable, current: TimeOfDay) -> TimeOfDay {
    if next_day.len() >= 2 {
        next_day.first().unwrap_or(current)
    } else {
        current
    }
}

/// Today is over: the next day type's first two departures take over.
fn rollover(next_day: &Timetable) -> Option<(TimeOfDay, Option<TimeOfDay>)> {
    let current = next_day.first()?;
    let next = next_day.get(1).unwrap_or(current);
    Some((current, Some(next)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timetable(entries: &[&str]) -> Timetable {
        let (timetable, rejected) = Timetable::parse_entries(entries.iter().copied());
        assert!(rejected.is_empty());
        timetable
    }

    fn now(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn hhmm(departure: Option<Departure>) -> Option<String> {
        departure.map(|d| d.time.to_string())
    }

    #[test]
    fn skips_departures_already_gone() {
        let today = timetable(&["07:00", "07:30", "08:15"]);

        let result = compute_departures(&today, None, now("07:10")).unwrap();

        assert_eq!(result.current.time.to_string(), "07:30");
        assert_eq!(result.current.minutes_remaining, 20);
        assert_eq!(hhmm(result.next).as_deref(), Some("08:15"));
        assert_eq!(result.next.unwrap().minutes_remaining, 65);
    }

    #[test]
    fn before_first_departure() {
        let today = timetable(&["07:00", "07:30"]);

        let result = compute_departures(&today, None, now("06:00")).unwrap();

        assert_eq!(result.current.time.to_string(), "07:00");
        assert_eq!(result.current.minutes_remaining, 60);
        assert_eq!(hhmm(result.next).as_deref(), Some("07:30"));
    }

    #[test]
    fn last_departure_continues_into_next_day_type() {
        let today = timetable(&["07:00", "07:30"]);
        let tomorrow = timetable(&["05:00", "06:00"]);

        let result = compute_departures(&today, Some(&tomorrow), now("07:30")).unwrap();

        assert_eq!(result.current.time.to_string(), "07:30");
        assert_eq!(result.current.minutes_remaining, 0);
        let next = result.next.unwrap();
        assert_eq!(next.time.to_string(), "05:00");
        // 07:30 -> 05:00 crosses midnight: 21h30m
        assert_eq!(next.minutes_remaining, 21 * 60 + 30);
    }

    #[test]
    fn last_departure_with_sparse_next_day_repeats_current() {
        let today = timetable(&["07:00", "07:30"]);

        let single = timetable(&["05:00"]);
        let result = compute_departures(&today, Some(&single), now("07:20")).unwrap();
        assert_eq!(hhmm(result.next).as_deref(), Some("07:30"));
        assert_eq!(result.next.unwrap().minutes_remaining, 10);

        let empty = Timetable::default();
        let result = compute_departures(&today, Some(&empty), now("07:20")).unwrap();
        assert_eq!(hhmm(result.next).as_deref(), Some("07:30"));
    }

    #[test]
    fn last_departure_without_next_day_omits_next() {
        let today = timetable(&["07:00", "07:30"]);

        let result = compute_departures(&today, None, now("07:20")).unwrap();

        assert_eq!(result.current.time.to_string(), "07:30");
        assert!(result.next.is_none());
    }

    #[test]
    fn after_last_departure_rolls_over() {
        let today = timetable(&["22:00"]);
        let tomorrow = timetable(&["06:00", "06:30"]);

        let result = compute_departures(&today, Some(&tomorrow), now("23:00")).unwrap();

        assert_eq!(result.current.time.to_string(), "06:00");
        assert_eq!(result.current.minutes_remaining, 7 * 60);
        assert_eq!(hhmm(result.next).as_deref(), Some("06:30"));
        assert_eq!(result.next.unwrap().minutes_remaining, 7 * 60 + 30);
    }

    #[test]
    fn rollover_with_single_departure_repeats_it() {
        let today = timetable(&["22:00"]);
        let tomorrow = timetable(&["06:00"]);

        let result = compute_departures(&today, Some(&tomorrow), now("23:00")).unwrap();

        assert_eq!(result.current.time.to_string(), "06:00");
        assert_eq!(hhmm(result.next).as_deref(), Some("06:00"));
    }

    #[test]
    fn rollover_without_next_day_reports_nothing() {
        let today = timetable(&["22:00"]);

        assert!(compute_departures(&today, None, now("23:00")).is_none());
        assert!(compute_departures(&today, Some(&Timetable::default()), now("23:00")).is_none());
    }

    #[test]
    fn empty_today_reports_nothing() {
        let tomorrow = timetable(&["06:00", "06:30"]);

        assert!(compute_departures(&Timetable::default(), Some(&tomorrow), now("12:00")).is_none());
        assert!(compute_departures(&Timetable::default(), None, now("12:00")).is_none());
    }

    #[test]
    fn departure_after_midnight_counts_forward() {
        let today = timetable(&["23:40"]);
        let tomorrow = timetable(&["00:10", "00:40"]);

        let result = compute_departures(&today, Some(&tomorrow), now("23:50")).unwrap();

        assert_eq!(result.current.time.to_string(), "00:10");
        assert_eq!(result.current.minutes_remaining, 20);
    }

    #[test]
    fn seconds_past_a_departure_mean_it_has_gone() {
        let today = timetable(&["07:30", "07:45"]);
        let now = NaiveTime::from_hms_opt(7, 30, 20).unwrap();

        let result = compute_departures(&today, None, now).unwrap();

        assert_eq!(result.current.time.to_string(), "07:45");
        assert_eq!(result.current.minutes_remaining, 14);
    }

    #[test]
    fn unsorted_timetable_uses_last_entry_for_day_end() {
        // Stored order is trusted; the last entry decides whether the day is over
        let today = timetable(&["09:00", "06:00"]);
        let tomorrow = timetable(&["05:00", "05:30"]);

        let result = compute_departures(&today, Some(&tomorrow), now("07:00")).unwrap();
        assert_eq!(result.current.time.to_string(), "05:00");
    }

    #[test]
    fn entities_in_publication_order() {
        let today = timetable(&["07:00", "07:30"]);
        let result = compute_departures(&today, None, now("06:50")).unwrap();

        assert_eq!(
            result.entities(),
            vec![
                (CURRENT_DEPARTURE, "07:00".to_string()),
                (CURRENT_DEPARTURE_REMAINING, "10".to_string()),
                (NEXT_DEPARTURE, "07:30".to_string()),
                (NEXT_DEPARTURE_REMAINING, "40".to_string()),
            ]
        );
    }

    #[test]
    fn entities_without_next() {
        let today = timetable(&["07:00"]);
        let result = compute_departures(&today, None, now("06:50")).unwrap();

        let names: Vec<&str> = result.entities().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, [CURRENT_DEPARTURE, CURRENT_DEPARTURE_REMAINING]);
    }
}
