//! In-memory timetable store for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{DayType, RouteKey, Timetable, TimetableKey};

use super::TimetableStore;
use super::error::StoreError;

/// Timetable store backed by a map. Counts loads so callers can observe
/// caching behaviour.
#[derive(Debug, Default)]
pub struct MemoryTimetableStore {
    timetables: Mutex<BTreeMap<TimetableKey, Timetable>>,
    loads: AtomicUsize,
}

impl MemoryTimetableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `load` calls served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl TimetableStore for MemoryTimetableStore {
    async fn save(
        &self,
        route: &RouteKey,
        day_type: DayType,
        timetable: &Timetable,
    ) -> Result<(), StoreError> {
        let mut timetables = self.timetables.lock().unwrap_or_else(|e| e.into_inner());
        timetables.insert(TimetableKey::new(route.clone(), day_type), timetable.clone());
        Ok(())
    }

    async fn load(
        &self,
        route: &RouteKey,
        day_type: DayType,
    ) -> Result<Option<Timetable>, StoreError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let timetables = self.timetables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(timetables
            .get(&TimetableKey::new(route.clone(), day_type))
            .cloned())
    }

    async fn keys(&self) -> Result<Vec<TimetableKey>, StoreError> {
        let timetables = self.timetables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(timetables.keys().cloned().collect())
    }
}
