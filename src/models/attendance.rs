//! Attendance log, working session and discipline models.
//!
//! An [`AttendanceLog`] is the persisted record of one shift. A
//! [`WorkingSession`] is the ephemeral record of the shift currently in
//! progress; it becomes a `Closed` log when the worker clocks out.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle state of an attendance log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// The worker is still working; synthesized from the open session.
    Open,
    /// The worker clocked out.
    Closed,
    /// The worker missed the clock-in window and was marked as a no-show.
    Absent,
}

/// One row per completed or in-progress shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceLog {
    /// Identifier used to target corrections. Legacy rows may lack one.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// The worker the shift belongs to.
    pub worker_id: String,
    /// The branch the worker clocked in at.
    pub branch_id: String,
    /// Lifecycle state.
    pub kind: LogKind,
    /// The date the shift is attributed to (the closing date).
    pub date: NaiveDate,
    /// Wall-clock start, absent for no-show rows.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Wall-clock end, absent for open and no-show rows.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Worked minutes, stored as `HH:MM` text.
    #[serde(with = "hhmm", default)]
    pub duration_minutes: i64,
    /// Clocked in after the scheduled start.
    #[serde(default)]
    pub is_late: bool,
    /// Missed the late grace window entirely.
    #[serde(default)]
    pub is_no_show_late: bool,
    /// Worked without a schedule, via an approved request.
    #[serde(default)]
    pub is_unscheduled: bool,
    /// Covered a one-off substitute shift.
    #[serde(default)]
    pub is_sub: bool,
}

impl AttendanceLog {
    /// Start of the shift as a timestamp, if a start time is recorded.
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        self.start_time.map(|t| self.date.and_time(t))
    }
}

/// The shift a worker currently has open. At most one per worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSession {
    /// The worker on shift.
    pub worker_id: String,
    /// The branch the worker clocked in at.
    pub branch_id: String,
    /// When the session opened.
    pub started_at: NaiveDateTime,
    /// Opened after the scheduled start.
    pub is_late: bool,
    /// Opened through an approved unscheduled-work request.
    pub is_unscheduled: bool,
    /// Opened against a one-off substitute shift.
    pub is_sub: bool,
}

impl WorkingSession {
    /// Renders the session as the `Open` log the pay engine consumes.
    pub fn to_open_log(&self) -> AttendanceLog {
        AttendanceLog {
            id: None,
            worker_id: self.worker_id.clone(),
            branch_id: self.branch_id.clone(),
            kind: LogKind::Open,
            date: self.started_at.date(),
            start_time: Some(self.started_at.time()),
            end_time: None,
            duration_minutes: 0,
            is_late: self.is_late,
            is_no_show_late: false,
            is_unscheduled: self.is_unscheduled,
            is_sub: self.is_sub,
        }
    }
}

/// Per-worker absence tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineStatus {
    /// Absences recorded since the last administrative clear.
    pub absence_count: u32,
    /// Set once the count reaches the discipline threshold.
    pub suspended: bool,
}

/// Minutes from `start` to `end`, wrapping past midnight when `end < start`.
///
/// # Example
///
/// ```
/// use chrono::NaiveTime;
/// use shift_ledger::models::minutes_between;
///
/// let start = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
/// let end = NaiveTime::from_hms_opt(0, 15, 0).unwrap();
/// assert_eq!(minutes_between(start, end), 45);
/// ```
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> i64 {
    let minutes = (end - start).num_minutes();
    if minutes < 0 { minutes + 24 * 60 } else { minutes }
}

/// Parses an `HH:MM` wall-clock value.
pub fn parse_clock_time(value: &str) -> EngineResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| EngineError::InvalidTime {
        value: value.to_string(),
    })
}

/// Formats a minute count as `HH:MM` (with a leading `-` when negative).
pub fn format_duration(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Parses an `HH:MM` duration into whole minutes.
pub fn parse_duration(value: &str) -> EngineResult<i64> {
    let invalid = || EngineError::InvalidTime {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (hours, minutes) = body.split_once(':').ok_or_else(invalid)?;
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    let total = hours * 60 + minutes;
    Ok(if negative { -total } else { total })
}

/// Serde adapter storing minute counts as `HH:MM` text.
pub mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serializes minutes as `HH:MM`.
    pub fn serialize<S: Serializer>(minutes: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*minutes))
    }

    /// Deserializes `HH:MM` into minutes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_minutes_between_same_day() {
        assert_eq!(minutes_between(time(9, 0), time(17, 30)), 510);
    }

    #[test]
    fn test_minutes_between_wraps_past_midnight() {
        assert_eq!(minutes_between(time(23, 30), time(0, 15)), 45);
        assert_eq!(minutes_between(time(22, 0), time(6, 0)), 480);
    }

    #[test]
    fn test_minutes_between_equal_times_is_zero() {
        assert_eq!(minutes_between(time(9, 0), time(9, 0)), 0);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("08:00").unwrap(), 480);
        assert_eq!(parse_duration("0:45").unwrap(), 45);
        assert_eq!(parse_duration("-00:30").unwrap(), -30);
        assert!(parse_duration("8h").is_err());
        assert!(parse_duration("08:75").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(480), "08:00");
        assert_eq!(format_duration(45), "00:45");
        assert_eq!(format_duration(1505), "25:05");
        assert_eq!(format_duration(-30), "-00:30");
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(parse_clock_time("09:05").unwrap(), time(9, 5));
        assert!(matches!(
            parse_clock_time("25:00"),
            Err(EngineError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_log_duration_serializes_as_hhmm() {
        let log = AttendanceLog {
            id: None,
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            kind: LogKind::Closed,
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            start_time: Some(time(9, 0)),
            end_time: Some(time(17, 0)),
            duration_minutes: 480,
            is_late: false,
            is_no_show_late: false,
            is_unscheduled: false,
            is_sub: false,
        };

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"duration_minutes\":\"08:00\""));
        assert!(json.contains("\"kind\":\"closed\""));
    }

    #[test]
    fn test_legacy_log_without_id_or_flags_deserializes() {
        let json = r#"{
            "worker_id": "w_001",
            "branch_id": "main",
            "kind": "absent",
            "date": "2025-03-04"
        }"#;

        let log: AttendanceLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.id, None);
        assert_eq!(log.kind, LogKind::Absent);
        assert_eq!(log.duration_minutes, 0);
        assert_eq!(log.started_at(), None);
    }

    #[test]
    fn test_session_to_open_log() {
        let session = WorkingSession {
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            started_at: NaiveDate::from_ymd_opt(2025, 3, 4)
                .unwrap()
                .and_hms_opt(9, 3, 0)
                .unwrap(),
            is_late: true,
            is_unscheduled: false,
            is_sub: true,
        };

        let log = session.to_open_log();
        assert_eq!(log.kind, LogKind::Open);
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(log.start_time, Some(time(9, 3)));
        assert!(log.is_late);
        assert!(log.is_sub);
    }
}
