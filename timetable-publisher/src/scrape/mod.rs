//! Timetable scraping.
//!
//! Turns a configured schedule page into one timetable per day type. The
//! page is treated as plain server-rendered markup; see [`parse_schedule`]
//! for the table layout it expects.
//!
//! No script runs on the fetched page. A site that fills the schedule table
//! in from JavaScript yields [`ScrapeError::MissingSchedule`] or
//! [`ScrapeError::NoDayTypes`], and the stored timetables are left as they
//! were.

mod client;
mod error;
mod parse;

use std::future::Future;

use crate::domain::RouteSource;

pub use client::{HttpTimetableSource, ScraperConfig};
pub use error::ScrapeError;
pub use parse::{DayTimetables, SCHEDULE_CONTAINER, parse_schedule};

/// Something that can produce the timetables of a route.
///
/// This abstraction allows the service to be tested without network access.
pub trait TimetableSource: Send + Sync {
    /// Fetch every day type's timetable for a route.
    fn fetch(
        &self,
        source: &RouteSource,
    ) -> impl Future<Output = Result<DayTimetables, ScrapeError>> + Send;
}
