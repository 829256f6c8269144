//! Disk-backed timetable store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::domain::{DayType, RouteKey, Timetable, TimetableKey};

use super::TimetableStore;
use super::error::StoreError;

/// Stores each timetable as `timetable_{bus}_{stop}_{direction}_{daytype}.json`
/// in one data directory.
///
/// Writes go to a temporary file that is renamed into place, and all access
/// to one route is serialised through a per-route lock, so a reader never
/// sees a partially written file.
#[derive(Debug)]
pub struct FileTimetableStore {
    dir: PathBuf,
    locks: Mutex<HashMap<RouteKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileTimetableStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the file holding a key.
    pub fn path_for(&self, key: &TimetableKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn lock_for(&self, route: &RouteKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(route.clone()).or_default())
    }
}

impl TimetableStore for FileTimetableStore {
    async fn save(
        &self,
        route: &RouteKey,
        day_type: DayType,
        timetable: &Timetable,
    ) -> Result<(), StoreError> {
        let path = self.path_for(&TimetableKey::new(route.clone(), day_type));
        let json = serde_json::to_string(timetable)?;

        let lock = self.lock_for(route);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StoreError::io(&self.dir))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(StoreError::io(&tmp))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(StoreError::io(&path))?;

        debug!(path = %path.display(), departures = timetable.len(), "saved timetable");
        Ok(())
    }

    async fn load(
        &self,
        route: &RouteKey,
        day_type: DayType,
    ) -> Result<Option<Timetable>, StoreError> {
        let path = self.path_for(&TimetableKey::new(route.clone(), day_type));

        let lock = self.lock_for(route);
        let _guard = lock.lock().await;

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path)(e)),
        };

        // A JSON null means nothing is stored
        let entries: Option<Vec<String>> =
            serde_json::from_str(&contents).map_err(|e| StoreError::Format {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let Some(entries) = entries else {
            return Ok(None);
        };

        let (timetable, rejected) = Timetable::parse_entries(entries.iter().map(String::as_str));
        for entry in rejected {
            warn!(
                path = %path.display(),
                index = entry.index,
                entry = %entry.text,
                error = %entry.error,
                "skipping malformed departure time"
            );
        }

        Ok(Some(timetable))
    }

    async fn keys(&self) -> Result<Vec<TimetableKey>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir)(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(StoreError::io(&self.dir))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !TimetableKey::is_candidate(name) {
                continue;
            }

            match TimetableKey::parse_file_name(name) {
                Ok(key) => keys.push(key),
                Err(e) => warn!(file = name, error = %e, "ignoring unrecognised timetable file"),
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn route() -> RouteKey {
        RouteKey::new("4g", "0705", "a-b").unwrap()
    }

    fn timetable(entries: &[&str]) -> Timetable {
        Timetable::parse_entries(entries.iter().copied()).0
    }

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileTimetableStore::new(dir.path());

        let saved = timetable(&["06:00", "06:30", "07:15"]);
        store.save(&route(), DayType::Workday, &saved).await.unwrap();

        let loaded = store.load(&route(), DayType::Workday).await.unwrap();
        assert_eq!(loaded, Some(saved));
    }

    #[tokio::test]
    async fn file_layout_matches_naming_scheme() {
        let dir = tempdir().unwrap();
        let store = FileTimetableStore::new(dir.path());

        store
            .save(&route(), DayType::Sunday, &timetable(&["09:05"]))
            .await
            .unwrap();

        let path = dir.path().join("timetable_4g_0705_a-b_sunday.json");
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, r#"["09:05"]"#);
    }

    #[tokio::test]
    async fn missing_timetable_is_none() {
        let dir = tempdir().unwrap();
        let store = FileTimetableStore::new(dir.path().join("never-created"));

        assert!(store.load(&route(), DayType::Saturday).await.unwrap().is_none());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileTimetableStore::new(dir.path());

        store
            .save(&route(), DayType::Workday, &timetable(&["06:00", "06:30"]))
            .await
            .unwrap();
        store
            .save(&route(), DayType::Workday, &timetable(&["08:00"]))
            .await
            .unwrap();

        let loaded = store.load(&route(), DayType::Workday).await.unwrap().unwrap();
        assert_eq!(loaded, timetable(&["08:00"]));
    }

    #[tokio::test]
    async fn creates_data_directory() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let store = FileTimetableStore::new(&data_dir);

        store
            .save(&route(), DayType::Workday, &Timetable::default())
            .await
            .unwrap();

        assert!(data_dir.join("timetable_4g_0705_a-b_workday.json").exists());
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("timetable_4g_0705_a-b_workday.json"),
            r#"["06:00", "6:15", "bogus", "07:00"]"#,
        )
        .unwrap();
        let store = FileTimetableStore::new(dir.path());

        let loaded = store.load(&route(), DayType::Workday).await.unwrap().unwrap();
        assert_eq!(loaded, timetable(&["06:00", "07:00"]));
    }

    #[tokio::test]
    async fn null_file_is_absent() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("timetable_4g_0705_a-b_workday.json"), "null").unwrap();
        let store = FileTimetableStore::new(dir.path());

        assert!(store.load(&route(), DayType::Workday).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_list_file_is_format_error() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("timetable_4g_0705_a-b_workday.json"),
            r#"{"times": []}"#,
        )
        .unwrap();
        let store = FileTimetableStore::new(dir.path());

        let err = store.load(&route(), DayType::Workday).await.unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }));
    }

    #[tokio::test]
    async fn keys_lists_each_file_independently() {
        let dir = tempdir().unwrap();
        let store = FileTimetableStore::new(dir.path());
        let other = RouteKey::new("12", "1101", "b-a").unwrap();

        store
            .save(&route(), DayType::Workday, &Timetable::default())
            .await
            .unwrap();
        store
            .save(&other, DayType::Saturday, &Timetable::default())
            .await
            .unwrap();
        // Unrelated and unparseable files are ignored, not attributed to a neighbour
        std::fs::write(dir.path().join("timetable_bad_holiday.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let keys = store.keys().await.unwrap();
        assert_eq!(
            keys,
            vec![
                TimetableKey::new(other, DayType::Saturday),
                TimetableKey::new(route(), DayType::Workday),
            ]
        );
    }

    #[tokio::test]
    async fn concurrent_saves_leave_a_complete_file() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileTimetableStore::new(dir.path()));

        let long = timetable(&["05:00", "05:30", "06:00", "06:30", "07:00", "07:30"]);
        let short = timetable(&["12:00"]);

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            let timetable = if i % 2 == 0 { long.clone() } else { short.clone() };
            handles.push(tokio::spawn(async move {
                store.save(&route(), DayType::Workday, &timetable).await.unwrap();
                store.load(&route(), DayType::Workday).await.unwrap().unwrap()
            }));
        }

        for handle in handles {
            let loaded = handle.await.unwrap();
            assert!(loaded == long || loaded == short);
        }
    }
}
