//! In-memory record store.
//!
//! Used by the HTTP server and by tests. State lives in plain collections;
//! [`StoreSeed`] loads the externally maintained records (workers, schedules,
//! holiday rates) from JSON.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::models::{
    AttendanceLog, DisciplineStatus, ExceptionRequest, ExpenseClaim, FixedShiftEntry,
    HolidayRateTable, LogKind, OneOffEntry, RequestId, ShiftWindow, Worker, WorkingSession,
};

use super::{Change, LogTarget, Repository, StateDelta};

/// Records maintained outside the core, loaded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSeed {
    /// Worker roster.
    pub workers: Vec<Worker>,
    /// Holiday supplemental rates.
    pub holiday_rates: HolidayRateTable,
    /// Fixed weekly schedule rows.
    pub fixed_shifts: Vec<FixedShiftEntry>,
    /// One-off schedule overrides.
    pub one_off_entries: Vec<OneOffEntry>,
    /// Historical attendance logs.
    pub attendance_logs: Vec<AttendanceLog>,
}

/// A [`Repository`] backed by in-process collections.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    workers: HashMap<String, Worker>,
    logs: Vec<AttendanceLog>,
    sessions: HashMap<String, WorkingSession>,
    working_markers: HashSet<String>,
    no_show_locks: HashSet<(String, NaiveDate)>,
    discipline: HashMap<String, DisciplineStatus>,
    pending: Vec<ExceptionRequest>,
    archive: Vec<ExceptionRequest>,
    holiday_rates: HolidayRateTable,
    expense_claims: Vec<ExpenseClaim>,
    fixed_shifts: HashMap<(String, String, Weekday), ShiftWindow>,
    one_offs: Vec<OneOffEntry>,
    next_request_id: RequestId,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            workers: HashMap::new(),
            logs: Vec::new(),
            sessions: HashMap::new(),
            working_markers: HashSet::new(),
            no_show_locks: HashSet::new(),
            discipline: HashMap::new(),
            pending: Vec::new(),
            archive: Vec::new(),
            holiday_rates: HolidayRateTable::default(),
            expense_claims: Vec::new(),
            fixed_shifts: HashMap::new(),
            one_offs: Vec::new(),
            next_request_id: 1,
        }
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the seeded records.
    pub fn from_seed(seed: StoreSeed) -> Self {
        let mut store = Self::new();
        for worker in seed.workers {
            store.upsert_worker(worker);
        }
        for row in seed.fixed_shifts {
            store.set_fixed_shift(row);
        }
        for entry in seed.one_off_entries {
            store.add_one_off_entry(entry);
        }
        store.holiday_rates = seed.holiday_rates;
        store.logs = seed.attendance_logs;
        store
    }

    /// Inserts or replaces a worker.
    pub fn upsert_worker(&mut self, worker: Worker) {
        self.workers.insert(worker.id.clone(), worker);
    }

    /// Sets one row of a fixed weekly schedule.
    pub fn set_fixed_shift(&mut self, row: FixedShiftEntry) {
        let window = row.window();
        self.fixed_shifts
            .insert((row.worker_id, row.month, row.weekday), window);
    }

    /// Adds a one-off schedule entry.
    pub fn add_one_off_entry(&mut self, entry: OneOffEntry) {
        self.one_offs.push(entry);
    }

    /// Mutable access to the holiday rate table.
    pub fn holiday_rates_mut(&mut self) -> &mut HolidayRateTable {
        &mut self.holiday_rates
    }

    /// Appends a log outside of any transition (e.g. imported history).
    pub fn append_log(&mut self, log: AttendanceLog) {
        self.logs.push(log);
    }

    /// Administrative discipline reset.
    pub fn set_discipline(&mut self, worker_id: &str, status: DisciplineStatus) {
        self.discipline.insert(worker_id.to_string(), status);
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::AppendLog(log) => self.logs.push(log),
            Change::CorrectLog {
                worker_id,
                target,
                start_time,
                end_time,
                duration_minutes,
            } => {
                let is_target = |log: &AttendanceLog| {
                    log.worker_id == worker_id
                        && match &target {
                            LogTarget::Id(id) => log.id == Some(*id),
                            LogTarget::Date(date) => log.date == *date,
                        }
                };
                // by date, a worked row wins over an absence row
                let position = self
                    .logs
                    .iter()
                    .position(|log| is_target(log) && log.kind != LogKind::Absent)
                    .or_else(|| self.logs.iter().position(is_target));
                match position.and_then(|i| self.logs.get_mut(i)) {
                    Some(log) => {
                        log.start_time = Some(start_time);
                        log.end_time = Some(end_time);
                        log.duration_minutes = duration_minutes;
                    }
                    None => warn!(worker_id = %worker_id, ?target, "Correction target vanished"),
                }
            }
            Change::OpenSession(session) => {
                self.sessions.insert(session.worker_id.clone(), session);
            }
            Change::CloseSession { worker_id } => {
                self.sessions.remove(&worker_id);
            }
            Change::SetWorkingMarker { worker_id, working } => {
                if working {
                    self.working_markers.insert(worker_id);
                } else {
                    self.working_markers.remove(&worker_id);
                }
            }
            Change::SetNoShowLock {
                worker_id,
                date,
                locked,
            } => {
                if locked {
                    self.no_show_locks.insert((worker_id, date));
                } else {
                    self.no_show_locks.remove(&(worker_id, date));
                }
            }
            Change::SetDiscipline { worker_id, status } => {
                self.discipline.insert(worker_id, status);
            }
            Change::FileRequest(request) => {
                self.next_request_id = self.next_request_id.max(request.id + 1);
                self.pending.push(request);
                self.pending.sort_by_key(|r| r.id);
            }
            Change::WithdrawRequest { request_id } => {
                self.pending.retain(|r| r.id != request_id);
            }
            Change::ArchiveRequest(request) => {
                self.pending.retain(|r| r.id != request.id);
                self.archive.push(request);
                self.archive.sort_by_key(|r| r.id);
            }
            Change::UnarchiveRequest { request_id } => {
                self.archive.retain(|r| r.id != request_id);
            }
            Change::AddExpenseClaim(claim) => self.expense_claims.push(claim),
            Change::RemoveExpenseClaim { request_id } => {
                self.expense_claims
                    .retain(|c| c.request_id != Some(request_id));
            }
            Change::UpdateWorker(worker) => self.upsert_worker(worker),
        }
    }
}

impl Repository for InMemoryStore {
    fn worker(&self, worker_id: &str) -> Option<Worker> {
        self.workers.get(worker_id).cloned()
    }

    fn attendance_logs(&self, worker_id: &str) -> Vec<AttendanceLog> {
        self.logs
            .iter()
            .filter(|log| log.worker_id == worker_id)
            .cloned()
            .collect()
    }

    fn working_session(&self, worker_id: &str) -> Option<WorkingSession> {
        self.sessions.get(worker_id).cloned()
    }

    fn working_sessions(&self) -> Vec<WorkingSession> {
        let mut sessions: Vec<_> = self.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        sessions
    }

    fn is_marked_working(&self, worker_id: &str) -> bool {
        self.working_markers.contains(worker_id)
    }

    fn no_show_locked(&self, worker_id: &str, date: NaiveDate) -> bool {
        self.no_show_locks
            .contains(&(worker_id.to_string(), date))
    }

    fn discipline(&self, worker_id: &str) -> DisciplineStatus {
        self.discipline.get(worker_id).copied().unwrap_or_default()
    }

    fn pending_requests(&self) -> Vec<ExceptionRequest> {
        self.pending.clone()
    }

    fn archived_requests(&self) -> Vec<ExceptionRequest> {
        self.archive.clone()
    }

    fn holiday_rates(&self) -> HolidayRateTable {
        self.holiday_rates.clone()
    }

    fn approved_expense_claims(&self, worker_id: &str) -> Vec<ExpenseClaim> {
        self.expense_claims
            .iter()
            .filter(|c| c.worker_id == worker_id)
            .cloned()
            .collect()
    }

    fn fixed_shift(&self, worker_id: &str, month: &str, weekday: Weekday) -> Option<ShiftWindow> {
        self.fixed_shifts
            .get(&(worker_id.to_string(), month.to_string(), weekday))
            .copied()
    }

    fn one_off_entries(&self, worker_id: &str, date: NaiveDate) -> Vec<OneOffEntry> {
        self.one_offs
            .iter()
            .filter(|e| e.worker_id == worker_id && e.date == date)
            .cloned()
            .collect()
    }

    fn next_request_id(&self) -> RequestId {
        self.next_request_id
    }

    fn commit(&mut self, delta: StateDelta) -> EngineResult<()> {
        debug!(changes = delta.len(), "Committing state delta");
        for change in delta {
            self.apply(change);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogKind, RequestPayload, RequestStatus};
    use chrono::{NaiveDateTime, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn request(id: RequestId) -> ExceptionRequest {
        ExceptionRequest::pending(
            id,
            "w_001",
            at(8, 0),
            RequestPayload::UnscheduledWork { date: date() },
        )
    }

    fn closed_log(id: Option<uuid::Uuid>) -> AttendanceLog {
        AttendanceLog {
            id,
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            kind: LogKind::Closed,
            date: date(),
            start_time: Some(time(9, 0)),
            end_time: Some(time(17, 0)),
            duration_minutes: 480,
            is_late: false,
            is_no_show_late: false,
            is_unscheduled: false,
            is_sub: false,
        }
    }

    #[test]
    fn test_filing_request_advances_next_id() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.next_request_id(), 1);

        let mut delta = StateDelta::default();
        delta.push(Change::FileRequest(request(5)));
        store.commit(delta).unwrap();

        assert_eq!(store.next_request_id(), 6);
        assert_eq!(store.pending_requests().len(), 1);
    }

    #[test]
    fn test_archive_moves_request_out_of_pending() {
        let mut store = InMemoryStore::new();
        let mut delta = StateDelta::default();
        delta.push(Change::FileRequest(request(1)));
        store.commit(delta).unwrap();

        let mut delta = StateDelta::default();
        delta.push(Change::ArchiveRequest(
            request(1).resolved(RequestStatus::Approved, at(9, 0)),
        ));
        store.commit(delta).unwrap();

        assert!(store.pending_requests().is_empty());
        assert_eq!(store.archived_requests()[0].status, RequestStatus::Approved);
    }

    #[test]
    fn test_correct_log_by_id_and_by_date() {
        let id = uuid::Uuid::new_v4();
        let mut store = InMemoryStore::new();
        store.append_log(closed_log(Some(id)));

        let mut delta = StateDelta::default();
        delta.push(Change::CorrectLog {
            worker_id: "w_001".to_string(),
            target: LogTarget::Id(id),
            start_time: time(10, 0),
            end_time: time(17, 0),
            duration_minutes: 420,
        });
        store.commit(delta).unwrap();
        assert_eq!(store.attendance_logs("w_001")[0].duration_minutes, 420);

        let mut delta = StateDelta::default();
        delta.push(Change::CorrectLog {
            worker_id: "w_001".to_string(),
            target: LogTarget::Date(date()),
            start_time: time(9, 30),
            end_time: time(17, 0),
            duration_minutes: 450,
        });
        store.commit(delta).unwrap();
        assert_eq!(store.attendance_logs("w_001")[0].start_time, Some(time(9, 30)));
    }

    #[test]
    fn test_locks_are_per_worker_and_date() {
        let mut store = InMemoryStore::new();
        let mut delta = StateDelta::default();
        delta.push(Change::SetNoShowLock {
            worker_id: "w_001".to_string(),
            date: date(),
            locked: true,
        });
        store.commit(delta).unwrap();

        assert!(store.no_show_locked("w_001", date()));
        assert!(!store.no_show_locked("w_002", date()));
        assert!(!store.no_show_locked("w_001", date().succ_opt().unwrap()));
    }

    #[test]
    fn test_seed_loads_schedules_from_json() {
        let json = r#"{
            "workers": [{ "id": "w_001", "name": "Kim", "branch_id": "main" }],
            "fixed_shifts": [{
                "worker_id": "w_001",
                "month": "2025-03",
                "weekday": "Tue",
                "start": "09:00:00",
                "end": "18:00:00"
            }],
            "holiday_rates": { "2025-03-01": "1000" }
        }"#;

        let seed: StoreSeed = serde_json::from_str(json).unwrap();
        let store = InMemoryStore::from_seed(seed);

        assert!(store.worker("w_001").is_some());
        assert_eq!(
            store.fixed_shift("w_001", "2025-03", Weekday::Tue),
            Some(ShiftWindow {
                start: time(9, 0),
                end: time(18, 0)
            })
        );
        assert!(store.holiday_rates().is_holiday(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    }
}
