//! Read cache in front of a timetable store.
//!
//! Departures are republished every few seconds but timetables only change
//! when a scrape runs, so loads are served from memory for a TTL. Saves go
//! through to the inner store and refresh the cached entry.
//!
//! A load that misses the cache and a save never overlap, so a miss can not
//! put a timetable older than the last save back into the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tokio::sync::RwLock;

use crate::domain::{DayType, RouteKey, Timetable, TimetableKey};

use super::TimetableStore;
use super::error::StoreError;

/// Cached load result; `None` remembers that nothing is stored.
type Entry = Option<Arc<Timetable>>;

/// Configuration for the store cache.
#[derive(Debug, Clone)]
pub struct StoreCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for StoreCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 1000,
        }
    }
}

/// Timetable store with an in-memory read cache.
pub struct CachedTimetableStore<S> {
    inner: S,
    timetables: MokaCache<TimetableKey, Entry>,
    /// Held shared by cache misses and exclusively by saves.
    refresh: RwLock<()>,
}

impl<S: TimetableStore> CachedTimetableStore<S> {
    /// Wrap a store.
    pub fn new(inner: S, config: &StoreCacheConfig) -> Self {
        let timetables = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            timetables,
            refresh: RwLock::new(()),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.timetables.invalidate_all();
    }
}

impl<S: TimetableStore> TimetableStore for CachedTimetableStore<S> {
    async fn save(
        &self,
        route: &RouteKey,
        day_type: DayType,
        timetable: &Timetable,
    ) -> Result<(), StoreError> {
        let key = TimetableKey::new(route.clone(), day_type);
        let _exclusive = self.refresh.write().await;

        if let Err(e) = self.inner.save(route, day_type, timetable).await {
            // The file may be in either state now; make the next load read it
            self.timetables.invalidate(&key).await;
            return Err(e);
        }

        self.timetables
            .insert(key, Some(Arc::new(timetable.clone())))
            .await;
        Ok(())
    }

    async fn load(
        &self,
        route: &RouteKey,
        day_type: DayType,
    ) -> Result<Option<Timetable>, StoreError> {
        let key = TimetableKey::new(route.clone(), day_type);

        if let Some(cached) = self.timetables.get(&key).await {
            return Ok(cached.map(|timetable| (*timetable).clone()));
        }

        let _shared = self.refresh.read().await;
        let loaded = self.inner.load(route, day_type).await?;
        self.timetables
            .insert(key, loaded.clone().map(Arc::new))
            .await;
        Ok(loaded)
    }

    async fn keys(&self) -> Result<Vec<TimetableKey>, StoreError> {
        self.inner.keys().await
    }
}
