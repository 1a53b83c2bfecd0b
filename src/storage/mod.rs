//! Snapshot storage.
//!
//! Each fetch from a remote system produces one complete snapshot. Stores
//! only ever hand back the most recent snapshot of a kind; there are no
//! partial updates.
//! - [`FsSnapshotStore`]: JSON files in the data directory
//! - [`MemorySnapshotStore`]: in-process, for tests and embedding

mod memory;
mod snapshot;

pub use memory::MemorySnapshotStore;
pub use snapshot::FsSnapshotStore;

use std::fmt;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::models::{CalendarDate, OfficialSnapshot, SecondarySnapshot};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snapshot file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No {0} snapshot found")]
    NotFound(SnapshotKind),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// The two kinds of snapshot the tool keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Official,
    Secondary,
}

impl SnapshotKind {
    /// Filename prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            SnapshotKind::Official => "official_data_",
            SnapshotKind::Secondary => "secondary_data_",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Official => write!(f, "official"),
            SnapshotKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// A snapshot type with a fixed storage kind.
pub trait Snapshot: Serialize + DeserializeOwned {
    const KIND: SnapshotKind;

    /// Fetch date as `YYYY/MM/DD`.
    fn fetch_date(&self) -> &str;

    /// Date stamp used in file names (`YYYY-MM-DD`).
    fn file_stamp(&self) -> String {
        match CalendarDate::new(self.fetch_date()).to_naive() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "undated".to_string(),
        }
    }
}

impl Snapshot for OfficialSnapshot {
    const KIND: SnapshotKind = SnapshotKind::Official;

    fn fetch_date(&self) -> &str {
        &self.fetch_date
    }
}

impl Snapshot for SecondarySnapshot {
    const KIND: SnapshotKind = SnapshotKind::Secondary;

    fn fetch_date(&self) -> &str {
        &self.fetch_date
    }
}

/// Repository of the latest snapshot per kind.
pub trait SnapshotStore {
    /// Load the most recent snapshot of `T`'s kind.
    fn load_latest<T: Snapshot>(&self) -> Result<T, StorageError>;

    /// Store a snapshot, making it the latest of its kind.
    fn save<T: Snapshot>(&self, snapshot: &T) -> Result<(), StorageError>;
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn debug_log_path(&self) -> PathBuf {
        self.data_dir.join("timo_debug.log")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
