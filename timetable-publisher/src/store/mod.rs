//! Timetable persistence.
//!
//! Timetables are stored per (route, day type) and overwritten wholesale on
//! every scrape. The file store keeps one JSON array of "HH:MM" strings per
//! key; the cached store sits in front of it so the frequent departure cycle
//! does not re-read the disk every few seconds.

mod cache;
mod error;
mod file;
mod memory;

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use crate::domain::{DayType, RouteKey, Timetable, TimetableKey};

pub use cache::{CachedTimetableStore, StoreCacheConfig};
pub use error::StoreError;
pub use file::FileTimetableStore;
pub use memory::MemoryTimetableStore;

/// Key → timetable persistence.
///
/// Implementations must tolerate saves and loads of the same key from
/// concurrently running jobs; the last write wins.
pub trait TimetableStore: Send + Sync {
    /// Replace the stored timetable for a route and day type.
    fn save(
        &self,
        route: &RouteKey,
        day_type: DayType,
        timetable: &Timetable,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Load a stored timetable, or `None` if nothing is stored for the key.
    fn load(
        &self,
        route: &RouteKey,
        day_type: DayType,
    ) -> impl Future<Output = Result<Option<Timetable>, StoreError>> + Send;

    /// Every stored key, sorted.
    fn keys(&self) -> impl Future<Output = Result<Vec<TimetableKey>, StoreError>> + Send;
}

/// Group stored keys by route.
pub fn routes_by_day_type(keys: Vec<TimetableKey>) -> BTreeMap<RouteKey, BTreeSet<DayType>> {
    let mut routes: BTreeMap<RouteKey, BTreeSet<DayType>> = BTreeMap::new();
    for key in keys {
        routes.entry(key.route).or_default().insert(key.day_type);
    }
    routes
}
