//! JSON snapshot files.
//!
//! Snapshots live in one directory as `<prefix><YYYY-MM-DD>.json`. The latest
//! snapshot of a kind is the most recently modified matching file, whatever
//! its contents say.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::Pattern;
use tracing::{debug, info, warn};

use super::{Snapshot, SnapshotKind, SnapshotStore, StorageConfig, StorageError};

/// Filesystem-backed snapshot store.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Create a store in the configured snapshots directory.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.snapshots_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a snapshot will be written to.
    pub fn path_for<T: Snapshot>(&self, snapshot: &T) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", T::KIND.prefix(), snapshot.file_stamp()))
    }

    fn pattern(&self, kind: SnapshotKind) -> Result<String, StorageError> {
        let dir = self
            .dir
            .to_str()
            .ok_or_else(|| StorageError::InvalidPath(format!("{:?}", self.dir)))?;
        Ok(format!("{}/{}*.json", Pattern::escape(dir), kind.prefix()))
    }

    /// Find the most recently modified file for `kind`.
    ///
    /// Equal modification times fall back to the later file name.
    pub fn latest_path(&self, kind: SnapshotKind) -> Result<PathBuf, StorageError> {
        let pattern = self.pattern(kind)?;
        let mut latest: Option<(SystemTime, PathBuf)> = None;

        for entry in glob::glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable snapshot entry: {}", e);
                    continue;
                }
            };

            let modified = fs::metadata(&path)?.modified()?;
            let newer = match &latest {
                Some((time, current)) => (modified, &path) > (*time, current),
                None => true,
            };
            if newer {
                latest = Some((modified, path));
            }
        }

        latest
            .map(|(_, path)| path)
            .ok_or(StorageError::NotFound(kind))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load_latest<T: Snapshot>(&self) -> Result<T, StorageError> {
        let path = self.latest_path(T::KIND)?;
        info!("Loading latest {} snapshot from {:?}", T::KIND, path);

        let contents = fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&contents)?;
        Ok(snapshot)
    }

    fn save<T: Snapshot>(&self, snapshot: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(snapshot);
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)?;

        debug!("Wrote {} bytes", fs::metadata(&path)?.len());
        info!("Saved {} snapshot to {:?}", T::KIND, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthRecord, OfficialSnapshot, SecondarySnapshot, TimeEntry};
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn official(fetch_date: &str, month: &str) -> OfficialSnapshot {
        OfficialSnapshot {
            fetch_date: fetch_date.to_string(),
            fetch_time: "12:00".to_string(),
            year: "2025".to_string(),
            monthly_data: vec![MonthRecord::new(month)],
            ..Default::default()
        }
    }

    fn stored_files(store: &FsSnapshotStore, kind: SnapshotKind) -> usize {
        fs::read_dir(store.dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(kind.prefix()))
            .count()
    }

    fn set_mtime(path: &Path, secs_after_epoch: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
            .unwrap();
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().join("snapshots"));

        let snapshot = official("2025/01/31", "January");
        store.save(&snapshot).unwrap();

        let loaded: OfficialSnapshot = store.load_latest().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(store
            .dir()
            .join("official_data_2025-01-31.json")
            .exists());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());

        let result: Result<SecondarySnapshot, _> = store.load_latest();
        assert!(matches!(
            result,
            Err(StorageError::NotFound(SnapshotKind::Secondary))
        ));
    }

    #[test]
    fn test_latest_by_modification_time() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());

        store.save(&official("2025/02/28", "February")).unwrap();
        store.save(&official("2025/01/31", "January")).unwrap();

        // The older-named file was touched last.
        set_mtime(&store.dir().join("official_data_2025-02-28.json"), 1_000);
        set_mtime(&store.dir().join("official_data_2025-01-31.json"), 2_000);

        let loaded: OfficialSnapshot = store.load_latest().unwrap();
        assert_eq!(loaded.monthly_data[0].month, "January");
    }

    #[test]
    fn test_equal_mtime_prefers_later_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());

        store.save(&official("2025/01/31", "January")).unwrap();
        store.save(&official("2025/02/28", "February")).unwrap();
        set_mtime(&store.dir().join("official_data_2025-01-31.json"), 5_000);
        set_mtime(&store.dir().join("official_data_2025-02-28.json"), 5_000);

        let loaded: OfficialSnapshot = store.load_latest().unwrap();
        assert_eq!(loaded.monthly_data[0].month, "February");
    }

    #[test]
    fn test_kinds_do_not_mix() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());

        store.save(&official("2025/01/31", "January")).unwrap();

        let secondary: Result<SecondarySnapshot, _> = store.load_latest();
        assert!(secondary.is_err());
        assert_eq!(stored_files(&store, SnapshotKind::Official), 1);
        assert_eq!(stored_files(&store, SnapshotKind::Secondary), 0);
    }

    #[test]
    fn test_same_day_save_replaces_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());

        let mut snapshot = SecondarySnapshot {
            fetch_date: "2025/01/31".to_string(),
            fetch_time: "09:00".to_string(),
            ..Default::default()
        };
        store.save(&snapshot).unwrap();

        snapshot.fetch_time = "17:30".to_string();
        snapshot.entries.push(TimeEntry::new("2025/01/31", "8h"));
        store.save(&snapshot).unwrap();

        assert_eq!(stored_files(&store, SnapshotKind::Secondary), 1);
        let loaded: SecondarySnapshot = store.load_latest().unwrap();
        assert_eq!(loaded.fetch_time, "17:30");
        assert_eq!(loaded.entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(temp_dir.path().to_path_buf());
        fs::write(temp_dir.path().join("official_data_2025-01-31.json"), "{ nope").unwrap();

        let result: Result<OfficialSnapshot, _> = store.load_latest();
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_from_config() {
        let config = StorageConfig::new(PathBuf::from("/data"));
        let store = FsSnapshotStore::from_config(&config);
        assert_eq!(store.dir(), Path::new("/data/snapshots"));
    }
}
