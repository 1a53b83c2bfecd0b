//! In-memory snapshot store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{Snapshot, SnapshotKind, SnapshotStore, StorageError};

/// Keeps only the latest snapshot of each kind, as JSON values.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<SnapshotKind, Value>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<SnapshotKind, Value>> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, kind: SnapshotKind) -> bool {
        self.slots().contains_key(&kind)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_latest<T: Snapshot>(&self) -> Result<T, StorageError> {
        let value = self
            .slots()
            .get(&T::KIND)
            .cloned()
            .ok_or(StorageError::NotFound(T::KIND))?;
        Ok(serde_json::from_value(value)?)
    }

    fn save<T: Snapshot>(&self, snapshot: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(snapshot)?;
        self.slots().insert(T::KIND, value);
        Ok(())
    }
}
