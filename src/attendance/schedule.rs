//! Scheduled shift resolution.
//!
//! A worker's shift for a day comes from, in priority order:
//! 1. an `Off` one-off entry, which cancels the day,
//! 2. a `Sub`/`Edu`/`Work` one-off entry with a time window,
//! 3. the fixed weekly schedule for that month and weekday.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{OneOffEntry, OneOffKind, ShiftWindow, month_key};
use crate::store::Repository;

/// Where a scheduled shift came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    /// A one-off entry of this kind.
    OneOff(OneOffKind),
    /// The fixed weekly schedule.
    Fixed,
}

/// The shift a worker is expected to work on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledShift {
    /// Start and end times.
    pub window: ShiftWindow,
    /// Which schedule produced the window.
    pub source: ScheduleSource,
}

impl ScheduledShift {
    /// True when the shift covers for another worker.
    pub fn is_sub(&self) -> bool {
        self.source == ScheduleSource::OneOff(OneOffKind::Sub)
    }
}

/// Picks the shift for a day from its one-off entries and fixed window.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use shift_ledger::attendance::resolve_scheduled_shift;
/// use shift_ledger::models::{OneOffEntry, OneOffKind, ShiftWindow};
///
/// let fixed = ShiftWindow {
///     start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
/// };
/// let day_off = OneOffEntry {
///     date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
///     worker_id: "w_001".to_string(),
///     kind: OneOffKind::Off,
///     start: None,
///     end: None,
/// };
///
/// assert!(resolve_scheduled_shift(&[], Some(fixed)).is_some());
/// assert!(resolve_scheduled_shift(&[day_off], Some(fixed)).is_none());
/// ```
pub fn resolve_scheduled_shift(
    one_offs: &[OneOffEntry],
    fixed: Option<ShiftWindow>,
) -> Option<ScheduledShift> {
    if one_offs.iter().any(|e| e.kind == OneOffKind::Off) {
        return None;
    }

    let one_off = one_offs.iter().find_map(|entry| {
        entry.window().map(|window| ScheduledShift {
            window,
            source: ScheduleSource::OneOff(entry.kind),
        })
    });

    one_off.or_else(|| {
        fixed.map(|window| ScheduledShift {
            window,
            source: ScheduleSource::Fixed,
        })
    })
}

/// Reads the one-off entries and fixed schedule for `date` and resolves them.
pub fn scheduled_shift<R: Repository + ?Sized>(
    repo: &R,
    worker_id: &str,
    date: NaiveDate,
) -> Option<ScheduledShift> {
    let one_offs = repo.one_off_entries(worker_id, date);
    let fixed = repo.fixed_shift(worker_id, &month_key(date), date.weekday());
    resolve_scheduled_shift(&one_offs, fixed)
}
