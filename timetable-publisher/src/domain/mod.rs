//! Domain types for the timetable publisher.
//!
//! These types represent validated timetable data. All types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod day_type;
mod route;
mod time;
mod timetable;

pub use day_type::{DayType, InvalidDayType};
pub use route::{InvalidRouteKey, RouteKey, RouteSource, TimetableKey};
pub use time::{TimeError, TimeOfDay};
pub use timetable::{RejectedEntry, Timetable};
