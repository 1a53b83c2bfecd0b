//! Records from the official timesheet system.
//!
//! The official system reports expected, worked and overtime durations per
//! day together with day classification flags, grouped by month.

use serde::{Deserialize, Serialize};

use super::{
    parse_reported_duration, CalendarDate, DayCategory, DayFlags, DurationError, DurationMinutes,
};

/// One day as reported by the official system.
///
/// Durations are kept as the text the source rendered. An empty expected
/// duration marks a non-working day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: CalendarDate,

    #[serde(default)]
    pub expected_duration: String,

    #[serde(default)]
    pub worked_duration: String,

    /// Signed difference between worked and expected time.
    #[serde(default)]
    pub overtime_duration: String,

    #[serde(flatten)]
    pub flags: DayFlags,
}

impl DayRecord {
    pub fn new(date: impl Into<CalendarDate>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    pub fn with_expected(mut self, text: impl Into<String>) -> Self {
        self.expected_duration = text.into();
        self
    }

    pub fn with_worked(mut self, text: impl Into<String>) -> Self {
        self.worked_duration = text.into();
        self
    }

    pub fn with_overtime(mut self, text: impl Into<String>) -> Self {
        self.overtime_duration = text.into();
        self
    }

    pub fn with_flags(mut self, flags: DayFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn expected(&self) -> Result<DurationMinutes, DurationError> {
        parse_reported_duration(&self.expected_duration)
    }

    pub fn worked(&self) -> Result<DurationMinutes, DurationError> {
        parse_reported_duration(&self.worked_duration)
    }

    pub fn overtime(&self) -> Result<DurationMinutes, DurationError> {
        parse_reported_duration(&self.overtime_duration)
    }

    pub fn category(&self) -> DayCategory {
        DayCategory::from_flags(&self.flags)
    }
}

/// A month of official records, in date order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Month label as shown by the source (e.g. "January").
    pub month: String,

    #[serde(default)]
    pub expected_worked_time_in_month: String,

    #[serde(default)]
    pub worked_time_in_month: String,

    #[serde(default)]
    pub overtime_in_month: String,

    #[serde(default)]
    pub daily_data: Vec<DayRecord>,
}

impl MonthRecord {
    pub fn new(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            ..Default::default()
        }
    }

    pub fn with_days(mut self, days: Vec<DayRecord>) -> Self {
        self.daily_data = days;
        self
    }
}

/// Everything fetched from the official system in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialSnapshot {
    /// `YYYY/MM/DD`
    pub fetch_date: String,
    /// `HH:MM`
    pub fetch_time: String,
    pub year: String,

    #[serde(default)]
    pub expected_worked_time_in_year: String,

    #[serde(default)]
    pub worked_time_in_year: String,

    #[serde(default)]
    pub overtime_in_year: String,

    #[serde(default)]
    pub monthly_data: Vec<MonthRecord>,
}

impl OfficialSnapshot {
    pub fn month_count(&self) -> usize {
        self.monthly_data.len()
    }
}
