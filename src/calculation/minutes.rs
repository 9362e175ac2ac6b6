//! Per-log worked minutes and minute-based proration.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::models::{AttendanceLog, LogKind};

/// Minutes a log is paid for.
///
/// Closed logs use their recorded duration. An open log is priced up to
/// `now`, floored to the minute and never negative. Absences are zero.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use shift_ledger::calculation::log_minutes;
/// use shift_ledger::models::{AttendanceLog, LogKind};
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// let open = AttendanceLog {
///     id: None,
///     worker_id: "w_001".to_string(),
///     branch_id: "main".to_string(),
///     kind: LogKind::Open,
///     date,
///     start_time: Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
///     end_time: None,
///     duration_minutes: 0,
///     is_late: false,
///     is_no_show_late: false,
///     is_unscheduled: false,
///     is_sub: false,
/// };
///
/// let now = date.and_hms_opt(10, 30, 59).unwrap();
/// assert_eq!(log_minutes(&open, now), 90);
/// ```
pub fn log_minutes(log: &AttendanceLog, now: NaiveDateTime) -> i64 {
    match log.kind {
        LogKind::Closed => log.duration_minutes,
        LogKind::Open => log
            .started_at()
            .map(|start| (now - start).num_seconds().div_euclid(60).max(0))
            .unwrap_or(0),
        LogKind::Absent => 0,
    }
}

/// `floor(minutes * hourly_rate / 60)`, zero for non-positive minutes.
///
/// Multiplies before dividing; the per-minute rate is never materialised.
pub fn prorate(minutes: i64, hourly_rate: Decimal) -> Decimal {
    if minutes <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(minutes) * hourly_rate / Decimal::from(60)).floor()
}

/// Renders minutes as `{hours}h{minutes}m`.
pub fn format_time_summary(total_minutes: i64) -> String {
    format!(
        "{}h{}m",
        total_minutes.div_euclid(60),
        total_minutes.rem_euclid(60)
    )
}
