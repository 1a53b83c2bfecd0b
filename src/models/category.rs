//! Day classification.

use serde::{Deserialize, Serialize};

use super::DayRecord;

/// Classification flags reported by the official system for one day.
///
/// The source does not keep these mutually exclusive; see [`classify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFlags {
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_vacation: bool,
    #[serde(default)]
    pub is_medical_leave: bool,
    #[serde(default)]
    pub is_calendar_adjustment: bool,
    #[serde(default)]
    pub is_weekend: bool,
    #[serde(default)]
    pub is_work_day: bool,
}

/// The single display category of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCategory {
    Holiday,
    Vacation,
    MedicalLeave,
    CalendarAdjustment,
    Weekend,
    WorkDay,
    Other,
}

impl DayCategory {
    /// Resolve flags in priority order: the first set flag wins.
    pub fn from_flags(flags: &DayFlags) -> Self {
        if flags.is_holiday {
            DayCategory::Holiday
        } else if flags.is_vacation {
            DayCategory::Vacation
        } else if flags.is_medical_leave {
            DayCategory::MedicalLeave
        } else if flags.is_calendar_adjustment {
            DayCategory::CalendarAdjustment
        } else if flags.is_weekend {
            DayCategory::Weekend
        } else if flags.is_work_day {
            DayCategory::WorkDay
        } else {
            DayCategory::Other
        }
    }
}

impl std::fmt::Display for DayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayCategory::Holiday => "holiday",
            DayCategory::Vacation => "vacation",
            DayCategory::MedicalLeave => "medical leave",
            DayCategory::CalendarAdjustment => "calendar adjustment",
            DayCategory::Weekend => "weekend",
            DayCategory::WorkDay => "work day",
            DayCategory::Other => "other",
        };
        f.write_str(name)
    }
}

/// Classify an official day record.
pub fn classify(day: &DayRecord) -> DayCategory {
    DayCategory::from_flags(&day.flags)
}
