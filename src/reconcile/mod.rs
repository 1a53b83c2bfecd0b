//! Reconciliation engine.
//!
//! Joins one month of official day records against the secondary system's
//! time entries by date and computes per-day and monthly discrepancies:
//! - secondary entries are summed per day, skipping non-work entries
//! - each day's diff is secondary minus official worked time
//! - days whose absolute diff exceeds [`ANOMALY_TOLERANCE`] are flagged
//!
//! Reconciliation only reads the snapshots; it never mutates them.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{
    CalendarDate, DayCategory, DayRecord, DurationMinutes, MonthRecord, OfficialSnapshot,
    TimeEntry,
};

/// Largest absolute daily diff that is still considered in agreement.
pub const ANOMALY_TOLERANCE: DurationMinutes = DurationMinutes(59);

/// One reconciled day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledDay {
    pub date: CalendarDate,
    pub category: DayCategory,
    /// Overtime text as reported by the official system.
    pub official_overtime: String,
    /// Worked time text as reported by the official system.
    pub official_worked: String,
    pub secondary_worked: DurationMinutes,
    pub diff: DurationMinutes,
    pub anomaly: bool,
}

/// Running totals over a reconciled month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub overtime: DurationMinutes,
    pub official_worked: DurationMinutes,
    pub secondary_worked: DurationMinutes,
    pub diff: DurationMinutes,
}

/// A month of reconciled days, in the official record's date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledMonth {
    pub month: String,
    pub days: Vec<ReconciledDay>,
    pub totals: MonthTotals,
}

impl ReconciledMonth {
    pub fn anomaly_count(&self) -> usize {
        self.days.iter().filter(|d| d.anomaly).count()
    }
}

/// Returns true if `diff` is outside the one-hour tolerance.
pub fn is_anomaly(diff: DurationMinutes) -> bool {
    diff.abs() > ANOMALY_TOLERANCE
}

/// Clamp a requested month index into `0..month_count`.
///
/// Returns `None` only when there are no months at all.
pub fn clamp_month_index(index: i64, month_count: usize) -> Option<usize> {
    if month_count == 0 {
        return None;
    }
    let last = month_count - 1;
    let clamped = usize::try_from(index.max(0)).map_or(last, |i| i.min(last));
    Some(clamped)
}

/// Pick a month from the snapshot, clamping out-of-range indices.
pub fn select_month(snapshot: &OfficialSnapshot, index: i64) -> Option<&MonthRecord> {
    let clamped = clamp_month_index(index, snapshot.month_count())?;
    if i64::try_from(clamped).ok() != Some(index) {
        debug!("Month index {} clamped to {}", index, clamped);
    }
    snapshot.monthly_data.get(clamped)
}

/// Month labels with their indices, in snapshot order.
pub fn list_months(snapshot: &OfficialSnapshot) -> Vec<(usize, &str)> {
    snapshot
        .monthly_data
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m.month.as_str()))
        .collect()
}

/// Sum the work time of entries, skipping excluded and unparseable ones.
pub fn aggregate_worked<'a, I>(entries: I) -> DurationMinutes
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let mut total = DurationMinutes::ZERO;

    for entry in entries {
        if entry.is_excluded() {
            info!(
                date = %entry.date,
                project = %entry.project,
                activity = %entry.activity,
                "Skipping non-work entry"
            );
            continue;
        }

        match entry.worked() {
            Ok(minutes) => total += minutes,
            Err(e) => warn!(date = %entry.date, error = %e, "Ignoring unparseable entry duration"),
        }
    }

    total
}

fn group_by_date(entries: &[TimeEntry]) -> HashMap<&CalendarDate, Vec<&TimeEntry>> {
    let mut grouped: HashMap<&CalendarDate, Vec<&TimeEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(&entry.date).or_default().push(entry);
    }
    grouped
}

/// Reconcile a single day against the entries logged on the same date.
pub fn reconcile_day(day: &DayRecord, entries_on_day: &[&TimeEntry]) -> ReconciledDay {
    let secondary_worked = aggregate_worked(entries_on_day.iter().copied());

    let official_worked = day.worked().unwrap_or_else(|e| {
        warn!(date = %day.date, error = %e, "Official worked time unparseable, counting as zero");
        DurationMinutes::ZERO
    });

    let diff = secondary_worked - official_worked;

    ReconciledDay {
        date: day.date.clone(),
        category: day.category(),
        official_overtime: day.overtime_duration.clone(),
        official_worked: day.worked_duration.clone(),
        secondary_worked,
        diff,
        anomaly: is_anomaly(diff),
    }
}

/// Reconcile one month of official records against all secondary entries.
pub fn reconcile(month: &MonthRecord, entries: &[TimeEntry]) -> ReconciledMonth {
    let by_date = group_by_date(entries);
    let mut totals = MonthTotals::default();
    let mut days = Vec::with_capacity(month.daily_data.len());

    for day in &month.daily_data {
        let on_day = by_date.get(&day.date).map(Vec::as_slice).unwrap_or(&[]);
        let row = reconcile_day(day, on_day);

        if let Ok(overtime) = day.overtime() {
            totals.overtime += overtime;
        }
        if let Ok(worked) = day.worked() {
            totals.official_worked += worked;
        }
        totals.secondary_worked += row.secondary_worked;
        totals.diff += row.diff;

        debug!(
            date = %row.date,
            secondary = %row.secondary_worked,
            diff = %row.diff,
            anomaly = row.anomaly,
            "Reconciled day"
        );
        days.push(row);
    }

    let result = ReconciledMonth {
        month: month.month.clone(),
        days,
        totals,
    };
    info!(
        "Reconciled {} with {} days, {} anomalies",
        result.month,
        result.days.len(),
        result.anomaly_count()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayFlags;

    fn work_day(date: &str, worked: &str, overtime: &str) -> DayRecord {
        DayRecord::new(date)
            .with_expected("8h")
            .with_worked(worked)
            .with_overtime(overtime)
            .with_flags(DayFlags {
                is_work_day: true,
                ..Default::default()
            })
    }

    fn dev_entry(date: &str, worked: &str) -> TimeEntry {
        TimeEntry::new(date, worked)
            .with_project("ProjA")
            .with_activity("dev")
    }

    fn month_of(days: Vec<DayRecord>) -> MonthRecord {
        MonthRecord::new("January").with_days(days)
    }

    #[test]
    fn test_matching_day_has_no_diff() {
        let month = month_of(vec![work_day("2025/01/06", "8h", "0m")]);
        let entries = vec![
            dev_entry("2025/01/06", "4:00:00"),
            dev_entry("2025/01/06", "4:00:00"),
        ];

        let result = reconcile(&month, &entries);
        let day = &result.days[0];

        assert_eq!(day.secondary_worked, DurationMinutes(480));
        assert_eq!(day.secondary_worked.to_string(), "8h");
        assert_eq!(day.diff, DurationMinutes(0));
        assert!(!day.anomaly);
        assert_eq!(day.category, DayCategory::WorkDay);
    }

    #[test]
    fn test_break_entry_is_excluded() {
        let month = month_of(vec![work_day("2025/01/06", "8h", "0m")]);
        let entries = vec![
            dev_entry("2025/01/06", "4h"),
            dev_entry("2025/01/06", "4h").with_project("Break"),
        ];

        let day = &reconcile(&month, &entries).days[0];

        assert_eq!(day.secondary_worked, DurationMinutes(240));
        assert_eq!(day.diff, DurationMinutes(-240));
        assert!(day.anomaly);
    }

    #[test]
    fn test_break_contributes_nothing_even_when_large() {
        let entries = vec![TimeEntry::new("2025/01/06", "8h").with_project("bReAk")];
        assert_eq!(aggregate_worked(&entries), DurationMinutes::ZERO);
    }

    #[test]
    fn test_no_entries_for_date() {
        let month = month_of(vec![work_day("2025/01/06", "7h 30m", "-30m")]);
        let day = &reconcile(&month, &[]).days[0];

        assert_eq!(day.secondary_worked, DurationMinutes::ZERO);
        assert_eq!(day.diff, DurationMinutes(-450));
        assert!(day.anomaly);
    }

    #[test]
    fn test_anomaly_boundary() {
        assert!(is_anomaly(DurationMinutes(60)));
        assert!(is_anomaly(DurationMinutes(-60)));
        assert!(!is_anomaly(DurationMinutes(59)));
        assert!(!is_anomaly(DurationMinutes(-59)));
        assert!(!is_anomaly(DurationMinutes(0)));
    }

    #[test]
    fn test_anomaly_boundary_through_reconcile() {
        let month = month_of(vec![
            work_day("2025/01/06", "8h", "0m"),
            work_day("2025/01/07", "8h", "0m"),
        ]);
        let entries = vec![
            dev_entry("2025/01/06", "9h"),
            dev_entry("2025/01/07", "8h 59m"),
        ];

        let result = reconcile(&month, &entries);
        assert_eq!(result.days[0].diff, DurationMinutes(60));
        assert!(result.days[0].anomaly);
        assert_eq!(result.days[1].diff, DurationMinutes(59));
        assert!(!result.days[1].anomaly);
    }

    #[test]
    fn test_monthly_totals() {
        let month = month_of(vec![
            work_day("2025/01/06", "8h", "0m"),
            work_day("2025/01/07", "9h", "1h"),
            work_day("2025/01/08", "7h", "-1h"),
        ]);
        let entries = vec![
            dev_entry("2025/01/06", "8h"),
            dev_entry("2025/01/07", "8h 30m"),
            dev_entry("2025/01/08", "7h"),
            dev_entry("2025/02/01", "5h"),
        ];

        let totals = reconcile(&month, &entries).totals;

        assert_eq!(totals.overtime, DurationMinutes(0));
        assert_eq!(totals.official_worked, DurationMinutes(24 * 60));
        assert_eq!(totals.secondary_worked, DurationMinutes(23 * 60 + 30));
        assert_eq!(totals.diff, DurationMinutes(-30));
    }

    #[test]
    fn test_unparseable_official_worked_counts_as_zero() {
        let month = month_of(vec![work_day("2025/01/06", "??", "n/a")]);
        let entries = vec![dev_entry("2025/01/06", "2h")];

        let result = reconcile(&month, &entries);
        let day = &result.days[0];

        assert_eq!(day.official_worked, "??");
        assert_eq!(day.official_overtime, "n/a");
        assert_eq!(day.diff, DurationMinutes(120));
        assert_eq!(result.totals.official_worked, DurationMinutes::ZERO);
        assert_eq!(result.totals.overtime, DurationMinutes::ZERO);
        assert_eq!(result.totals.secondary_worked, DurationMinutes(120));
    }

    #[test]
    fn test_huge_durations_saturate() {
        let huge = "153722867280912930h";
        let month = month_of(vec![
            work_day("2025/01/06", huge, huge),
            work_day("2025/01/07", huge, huge),
        ]);
        let entries = vec![
            dev_entry("2025/01/06", huge),
            dev_entry("2025/01/06", huge),
            dev_entry("2025/01/07", huge),
        ];

        let result = reconcile(&month, &entries);

        assert_eq!(result.days[0].secondary_worked, DurationMinutes(i64::MAX));
        assert_eq!(result.totals.official_worked, DurationMinutes(i64::MAX));
        assert_eq!(result.totals.overtime, DurationMinutes(i64::MAX));
        assert_eq!(result.totals.secondary_worked, DurationMinutes(i64::MAX));
    }

    #[test]
    fn test_unparseable_secondary_entry_skipped() {
        let entries = vec![
            dev_entry("2025/01/06", "4h"),
            dev_entry("2025/01/06", "garbage"),
        ];
        assert_eq!(aggregate_worked(&entries), DurationMinutes(240));
    }

    #[test]
    fn test_rows_keep_official_order() {
        let month = month_of(vec![
            work_day("2025/01/08", "8h", "0m"),
            work_day("2025/01/06", "8h", "0m"),
        ]);
        let result = reconcile(&month, &[]);
        let dates: Vec<&str> = result.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2025/01/08", "2025/01/06"]);
    }

    #[test]
    fn test_reconcile_does_not_touch_inputs() {
        let month = month_of(vec![work_day("2025/01/06", "8h", "0m")]);
        let entries = vec![dev_entry("2025/01/06", "3h")];
        let (month_before, entries_before) = (month.clone(), entries.clone());

        let first = reconcile(&month, &entries);
        let second = reconcile(&month, &entries);

        assert_eq!(month, month_before);
        assert_eq!(entries, entries_before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clamp_month_index() {
        assert_eq!(clamp_month_index(999, 3), Some(2));
        assert_eq!(clamp_month_index(1, 3), Some(1));
        assert_eq!(clamp_month_index(-5, 3), Some(0));
        assert_eq!(clamp_month_index(i64::MAX, 3), Some(2));
        assert_eq!(clamp_month_index(0, 0), None);
    }

    #[test]
    fn test_select_month_clamps() {
        let snapshot = OfficialSnapshot {
            monthly_data: vec![
                MonthRecord::new("January"),
                MonthRecord::new("February"),
                MonthRecord::new("March"),
            ],
            ..Default::default()
        };

        assert_eq!(select_month(&snapshot, 999).map(|m| m.month.as_str()), Some("March"));
        assert_eq!(select_month(&snapshot, -1).map(|m| m.month.as_str()), Some("January"));
        assert!(select_month(&OfficialSnapshot::default(), 0).is_none());
    }

    #[test]
    fn test_list_months() {
        let snapshot = OfficialSnapshot {
            monthly_data: vec![MonthRecord::new("January"), MonthRecord::new("February")],
            ..Default::default()
        };
        assert_eq!(list_months(&snapshot), vec![(0, "January"), (1, "February")]);
    }
}
