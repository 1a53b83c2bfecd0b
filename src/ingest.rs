//! Ingestion of extracted timesheet data.
//!
//! The HTML extractors hand over records exactly as the remote pages show
//! them: `DD/MM/YYYY` dates, `H:MM:SS` clock durations and free-text day
//! types. This module normalizes those raw exports into snapshots and stores
//! them as the latest of their kind.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    normalize_date, parse_clock_duration, DayFlags, DayRecord, MonthRecord, OfficialSnapshot,
    SecondarySnapshot, SecondarySummary, TimeEntry,
};
use crate::storage::{SnapshotStore, StorageError};

/// Errors that can occur while importing raw exports.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Nothing to import")]
    NothingToImport,
}

/// When a fetch happened, in the snapshot's text forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStamp {
    /// `YYYY/MM/DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

impl FetchStamp {
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self {
            date: at.format("%Y/%m/%d").to_string(),
            time: at.format("%H:%M").to_string(),
        }
    }
}

/// One day row from the official system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDay {
    pub date: String,
    /// Day type label, e.g. "Laborable", "Festivo", "Vacaciones".
    #[serde(default)]
    pub day_type: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub worked: String,
    #[serde(default)]
    pub overtime: String,
    #[serde(default)]
    pub is_holiday: Option<bool>,
    #[serde(default)]
    pub is_vacation: Option<bool>,
    #[serde(default)]
    pub is_medical_leave: Option<bool>,
    #[serde(default)]
    pub is_calendar_adjustment: Option<bool>,
    #[serde(default)]
    pub is_weekend: Option<bool>,
    #[serde(default)]
    pub is_work_day: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMonth {
    pub month: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub worked: String,
    #[serde(default)]
    pub overtime: String,
    #[serde(default)]
    pub days: Vec<RawDay>,
}

/// Everything the official extractor produced for one fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOfficialExport {
    pub year: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub worked: String,
    #[serde(default)]
    pub overtime: String,
    #[serde(default)]
    pub months: Vec<RawMonth>,
}

/// One timesheet row from the secondary system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    pub date: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub activity: String,
}

/// Everything the secondary extractor produced for one fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSecondaryExport {
    #[serde(default)]
    pub reporting_date_from: String,
    #[serde(default)]
    pub reporting_date_to: String,
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub official_days: Option<usize>,
    pub secondary_entries: Option<usize>,
}

/// Bring a duration cell into `Xh Ym` form.
///
/// Clock text goes through [`parse_clock_duration`]; anything else is only
/// trimmed.
pub fn normalize_duration_text(text: &str) -> String {
    if text.contains(':') {
        parse_clock_duration(text)
    } else {
        text.trim().to_string()
    }
}

/// Derive holiday and vacation flags from a day type label.
pub fn flags_from_label(label: &str) -> DayFlags {
    let label = label.trim();
    let is_holiday = label.contains("Festivo") || label.contains("Bank Holiday");
    let is_vacation = label.contains("Vacation")
        || label.contains("Vacaciones")
        || label.contains("Ausencia")
        || (!label.is_empty()
            && label != "Laborable"
            && label != "non working day"
            && !is_holiday);

    DayFlags {
        is_holiday,
        is_vacation,
        ..Default::default()
    }
}

/// Normalize one official day; rows without a date are dropped.
pub fn day_from_raw(raw: &RawDay) -> Option<DayRecord> {
    let date = normalize_date(&raw.date);
    if date.is_empty() {
        debug!("Dropping official row without a date");
        return None;
    }

    let expected = normalize_duration_text(&raw.expected);
    let from_label = flags_from_label(&raw.day_type);
    let flags = DayFlags {
        is_holiday: raw.is_holiday.unwrap_or(from_label.is_holiday),
        is_vacation: raw.is_vacation.unwrap_or(from_label.is_vacation),
        is_medical_leave: raw.is_medical_leave.unwrap_or(false),
        is_calendar_adjustment: raw.is_calendar_adjustment.unwrap_or(false),
        is_weekend: raw.is_weekend.unwrap_or(false),
        is_work_day: raw.is_work_day.unwrap_or(!expected.is_empty()),
    };

    Some(
        DayRecord::new(date)
            .with_expected(expected)
            .with_worked(normalize_duration_text(&raw.worked))
            .with_overtime(normalize_duration_text(&raw.overtime))
            .with_flags(flags),
    )
}

/// Build an official snapshot from a raw export.
pub fn build_official(raw: &RawOfficialExport, stamp: &FetchStamp) -> OfficialSnapshot {
    let monthly_data = raw
        .months
        .iter()
        .map(|month| MonthRecord {
            month: month.month.trim().to_string(),
            expected_worked_time_in_month: normalize_duration_text(&month.expected),
            worked_time_in_month: normalize_duration_text(&month.worked),
            overtime_in_month: normalize_duration_text(&month.overtime),
            daily_data: month.days.iter().filter_map(day_from_raw).collect(),
        })
        .collect();

    OfficialSnapshot {
        fetch_date: stamp.date.clone(),
        fetch_time: stamp.time.clone(),
        year: raw.year.trim().to_string(),
        expected_worked_time_in_year: normalize_duration_text(&raw.expected),
        worked_time_in_year: normalize_duration_text(&raw.worked),
        overtime_in_year: normalize_duration_text(&raw.overtime),
        monthly_data,
    }
}

/// Normalize one secondary entry; rows without a date are dropped.
pub fn entry_from_raw(raw: &RawEntry) -> Option<TimeEntry> {
    let date = normalize_date(&raw.date);
    if date.is_empty() {
        debug!("Dropping secondary row without a date");
        return None;
    }

    Some(TimeEntry {
        date,
        begin: normalize_duration_text(&raw.from),
        end: normalize_duration_text(&raw.to),
        worked_duration: normalize_duration_text(&raw.duration),
        customer: raw.customer.trim().to_string(),
        project: raw.project.trim().to_string(),
        activity: raw.activity.trim().to_string(),
    })
}

/// Build a secondary snapshot from a raw export.
pub fn build_secondary(raw: &RawSecondaryExport, stamp: &FetchStamp) -> SecondarySnapshot {
    SecondarySnapshot {
        fetch_date: stamp.date.clone(),
        fetch_time: stamp.time.clone(),
        summary: SecondarySummary {
            reporting_date_from: normalize_date(&raw.reporting_date_from).to_string(),
            reporting_date_to: normalize_date(&raw.reporting_date_to).to_string(),
            worker: raw.worker.trim().to_string(),
            worked_time: normalize_duration_text(&raw.total),
        },
        entries: raw.entries.iter().filter_map(entry_from_raw).collect(),
    }
}

/// Read and decode a raw export file.
pub async fn read_export<T: DeserializeOwned>(path: &Path) -> Result<T, IngestError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Import raw exports for either or both sources.
///
/// Both files are read and normalized concurrently; each resulting snapshot
/// replaces the stored one of its kind. If either file fails, nothing is
/// stored.
pub async fn import_files<S: SnapshotStore>(
    store: &S,
    official: Option<PathBuf>,
    secondary: Option<PathBuf>,
    stamp: FetchStamp,
) -> Result<ImportResult, IngestError> {
    if official.is_none() && secondary.is_none() {
        return Err(IngestError::NothingToImport);
    }

    let official_task = official.map(|path| {
        let stamp = stamp.clone();
        tokio::spawn(async move {
            info!("Importing official export from {:?}", path);
            let raw: RawOfficialExport = read_export(&path).await?;
            Ok::<_, IngestError>(build_official(&raw, &stamp))
        })
    });

    let secondary_task = secondary.map(|path| {
        let stamp = stamp.clone();
        tokio::spawn(async move {
            info!("Importing secondary export from {:?}", path);
            let raw: RawSecondaryExport = read_export(&path).await?;
            Ok::<_, IngestError>(build_secondary(&raw, &stamp))
        })
    });

    let official_snapshot = match official_task {
        Some(handle) => Some(handle.await??),
        None => None,
    };
    let secondary_snapshot = match secondary_task {
        Some(handle) => Some(handle.await??),
        None => None,
    };

    let mut result = ImportResult::default();

    if let Some(snapshot) = official_snapshot {
        let days: usize = snapshot.monthly_data.iter().map(|m| m.daily_data.len()).sum();
        if snapshot.monthly_data.is_empty() {
            warn!("Official export contains no months");
        }
        store.save(&snapshot)?;
        result.official_days = Some(days);
    }

    if let Some(snapshot) = secondary_snapshot {
        let entries = snapshot.entries.len();
        store.save(&snapshot)?;
        result.secondary_entries = Some(entries);
    }

    info!(
        "Import finished: {:?} official days, {:?} secondary entries",
        result.official_days, result.secondary_entries
    );
    Ok(result)
}
