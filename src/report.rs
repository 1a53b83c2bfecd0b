//! Report entry points.
//!
//! These tie the store, the reconciliation engine and the renderer together.
//! A missing or unreadable snapshot never fails a report: the caller gets an
//! empty string and decides how to present "no data".

use tracing::{info, warn};

use crate::models::{OfficialSnapshot, SecondarySnapshot};
use crate::reconcile::{list_months, reconcile, select_month};
use crate::render::{render, render_overview, PeriodMeta, RenderContext};
use crate::storage::{Snapshot, SnapshotStore, StorageError};

/// Month index that always selects the most recent month after clamping.
pub const LATEST_MONTH: i64 = i64::MAX;

fn load_or_log<S: SnapshotStore, T: Snapshot>(store: &S) -> Option<T> {
    match store.load_latest::<T>() {
        Ok(snapshot) => Some(snapshot),
        Err(StorageError::NotFound(kind)) => {
            info!("No {} snapshot available", kind);
            None
        }
        Err(e) => {
            warn!("Failed to load {} snapshot: {}", T::KIND, e);
            None
        }
    }
}

fn load_both<S: SnapshotStore>(store: &S) -> Option<(OfficialSnapshot, SecondarySnapshot)> {
    let official = load_or_log::<S, OfficialSnapshot>(store)?;
    let secondary = load_or_log::<S, SecondarySnapshot>(store)?;
    Some((official, secondary))
}

/// Reconcile the month at `month_index` and render it.
///
/// The index is clamped into the available months. Returns an empty string
/// when either snapshot is unavailable or the official one has no months.
pub fn reconcile_and_render<S: SnapshotStore>(
    store: &S,
    month_index: i64,
    ctx: &RenderContext,
) -> String {
    let Some((official, secondary)) = load_both(store) else {
        return String::new();
    };

    let Some(month) = select_month(&official, month_index) else {
        info!("Official snapshot has no months");
        return String::new();
    };

    let reconciled = reconcile(month, &secondary.entries);
    let meta = PeriodMeta::from_snapshots(&official, month, &secondary);
    render(&reconciled, &meta, ctx)
}

/// Render the overview block, or an empty string when data is missing.
pub fn overview<S: SnapshotStore>(store: &S, ctx: &RenderContext) -> String {
    match load_both(store) {
        Some((official, secondary)) => render_overview(&official, &secondary, ctx),
        None => String::new(),
    }
}

/// Month labels of the latest official snapshot, oldest first.
pub fn available_months<S: SnapshotStore>(store: &S) -> Vec<(usize, String)> {
    match load_or_log::<S, OfficialSnapshot>(store) {
        Some(official) => list_months(&official)
            .into_iter()
            .map(|(i, label)| (i, label.to_string()))
            .collect(),
        None => Vec::new(),
    }
}
