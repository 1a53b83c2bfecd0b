//! Records from the secondary timesheet system.
//!
//! The secondary system logs itemized time entries with project and activity
//! metadata; a single date may carry any number of entries.

use serde::{Deserialize, Serialize};

use super::{parse_reported_duration, CalendarDate, DurationError, DurationMinutes};

/// Project name used for breaks.
const BREAK_PROJECT: &str = "break";

/// Activity keywords marking time that is not work.
const NON_WORK_ACTIVITIES: [&str; 3] = ["vacation", "holiday", "free time"];

/// One logged time entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub date: CalendarDate,

    /// Start of the entry, in duration form (e.g. "9h 5m").
    #[serde(default)]
    pub begin: String,

    #[serde(default)]
    pub end: String,

    #[serde(default)]
    pub worked_duration: String,

    #[serde(default)]
    pub customer: String,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub activity: String,
}

impl TimeEntry {
    pub fn new(date: impl Into<CalendarDate>, worked: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            worked_duration: worked.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn worked(&self) -> Result<DurationMinutes, DurationError> {
        parse_reported_duration(&self.worked_duration)
    }

    /// Breaks, vacation, holidays and free time do not count as work.
    pub fn is_excluded(&self) -> bool {
        if self.project.to_lowercase() == BREAK_PROJECT {
            return true;
        }
        let activity = self.activity.to_lowercase();
        NON_WORK_ACTIVITIES
            .iter()
            .any(|keyword| activity.contains(keyword))
    }
}

/// Summary block reported alongside the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondarySummary {
    #[serde(default)]
    pub reporting_date_from: String,

    #[serde(default)]
    pub reporting_date_to: String,

    #[serde(default)]
    pub worker: String,

    /// Total worked time over the reporting range.
    #[serde(default)]
    pub worked_time: String,
}

/// Everything fetched from the secondary system in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondarySnapshot {
    pub fetch_date: String,
    pub fetch_time: String,

    #[serde(default)]
    pub summary: SecondarySummary,

    /// Flat list of entries, in source order.
    #[serde(default, alias = "monthly_data")]
    pub entries: Vec<TimeEntry>,
}
