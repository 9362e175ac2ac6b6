//! Schedule models: fixed weekly shifts and one-off overrides.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A scheduled start/end time pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// Scheduled start.
    pub start: NaiveTime,
    /// Scheduled end.
    pub end: NaiveTime,
}

/// The kind of a one-off schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneOffKind {
    /// Extra work day.
    Work,
    /// Covering for another worker.
    Sub,
    /// Training day.
    Edu,
    /// Explicit day off.
    Off,
}

/// A single-date schedule override for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneOffEntry {
    /// The date the override applies to.
    pub date: NaiveDate,
    /// The worker it applies to.
    pub worker_id: String,
    /// What kind of override it is.
    pub kind: OneOffKind,
    /// Start time; absent for `Off` entries.
    #[serde(default)]
    pub start: Option<NaiveTime>,
    /// End time; absent for `Off` entries.
    #[serde(default)]
    pub end: Option<NaiveTime>,
}

impl OneOffEntry {
    /// The working window of this entry, if it has both times.
    pub fn window(&self) -> Option<ShiftWindow> {
        match (self.kind, self.start, self.end) {
            (OneOffKind::Off, _, _) => None,
            (_, Some(start), Some(end)) => Some(ShiftWindow { start, end }),
            _ => None,
        }
    }
}

/// One row of a worker's fixed weekly schedule for a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedShiftEntry {
    /// The worker the row belongs to.
    pub worker_id: String,
    /// Month the row is valid for, as `YYYY-MM`.
    pub month: String,
    /// Day of the week.
    pub weekday: Weekday,
    /// Scheduled start.
    pub start: NaiveTime,
    /// Scheduled end.
    pub end: NaiveTime,
}

impl FixedShiftEntry {
    /// The window this row schedules.
    pub fn window(&self) -> ShiftWindow {
        ShiftWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// Formats the month a date falls in as `YYYY-MM`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use shift_ledger::models::month_key;
///
/// assert_eq!(month_key(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()), "2025-03");
/// ```
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: OneOffKind, start: Option<NaiveTime>, end: Option<NaiveTime>) -> OneOffEntry {
        OneOffEntry {
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            worker_id: "w_001".to_string(),
            kind,
            start,
            end,
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_off_entry_has_no_window() {
        let off = entry(OneOffKind::Off, Some(time(9, 0)), Some(time(18, 0)));
        assert_eq!(off.window(), None);
    }

    #[test]
    fn test_sub_entry_window() {
        let sub = entry(OneOffKind::Sub, Some(time(10, 0)), Some(time(15, 0)));
        assert_eq!(
            sub.window(),
            Some(ShiftWindow {
                start: time(10, 0),
                end: time(15, 0)
            })
        );
    }

    #[test]
    fn test_entry_without_times_has_no_window() {
        let edu = entry(OneOffKind::Edu, None, None);
        assert_eq!(edu.window(), None);
    }

    #[test]
    fn test_deserialize_fixed_shift_entry() {
        let json = r#"{
            "worker_id": "w_001",
            "month": "2025-03",
            "weekday": "Tue",
            "start": "09:00:00",
            "end": "18:00:00"
        }"#;

        let row: FixedShiftEntry = serde_json::from_str(json).unwrap();
        assert_eq!(row.weekday, Weekday::Tue);
        assert_eq!(row.window().start, time(9, 0));
    }

    #[test]
    fn test_month_key_pads_month() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(month_key(date), "2025-11");
    }
}
