//! Clock-in/clock-out against a repository.
//!
//! Each call reads a snapshot, computes the transition, and commits the
//! resulting delta in a single batch.

use std::fmt::Debug;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::{ConfigLoader, PolicyConfig};
use crate::error::{EngineError, EngineResult};
use crate::store::Repository;

use super::transition::{
    AttendanceEvent, ClockInOutcome, ClockOutOutcome, Transition, TransitionOutcome,
    WorkerSnapshot, apply_transition, clock_in_transition, clock_out_transition,
};

/// Reads, transitions and commits one attendance event.
///
/// The branch policy of the worker is resolved through `config`.
pub fn record_event<R: Repository + ?Sized>(
    repo: &mut R,
    config: &ConfigLoader,
    worker_id: &str,
    event: AttendanceEvent,
    now: NaiveDateTime,
) -> EngineResult<TransitionOutcome> {
    commit_transition(repo, config, worker_id, now, |snapshot, policy| {
        apply_transition(snapshot, policy, event, now)
    })
}

/// Clocks a worker in.
pub fn clock_in<R: Repository + ?Sized>(
    repo: &mut R,
    config: &ConfigLoader,
    worker_id: &str,
    now: NaiveDateTime,
) -> EngineResult<ClockInOutcome> {
    commit_transition(repo, config, worker_id, now, |snapshot, policy| {
        clock_in_transition(snapshot, policy, now)
    })
}

/// Clocks a worker out.
pub fn clock_out<R: Repository + ?Sized>(
    repo: &mut R,
    config: &ConfigLoader,
    worker_id: &str,
    now: NaiveDateTime,
) -> EngineResult<ClockOutOutcome> {
    commit_transition(repo, config, worker_id, now, |snapshot, _| {
        Ok(clock_out_transition(snapshot, now))
    })
}

fn commit_transition<R, O, F>(
    repo: &mut R,
    config: &ConfigLoader,
    worker_id: &str,
    now: NaiveDateTime,
    transition: F,
) -> EngineResult<O>
where
    R: Repository + ?Sized,
    O: Debug,
    F: FnOnce(&WorkerSnapshot, &PolicyConfig) -> EngineResult<Transition<O>>,
{
    let snapshot = WorkerSnapshot::read(repo, worker_id, now)?;
    let policy = config.policy_for(&snapshot.worker.branch_id);

    let transition = transition(&snapshot, &policy).inspect_err(|e| {
        if let EngineError::Suspended { .. } = e {
            warn!(worker_id = %worker_id, "Clock-in refused, worker is suspended");
        }
    })?;

    repo.commit(transition.delta)?;
    info!(
        worker_id = %worker_id,
        outcome = ?transition.outcome,
        "Attendance event recorded"
    );
    Ok(transition.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DisciplineStatus, FixedShiftEntry, HourlyRateComposition, LogKind, RequestKind, Worker,
    };
    use crate::store::InMemoryStore;
    use chrono::{Datelike, NaiveDate, NaiveTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn store_with_shift_on(days: &[u32]) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.upsert_worker(Worker {
            id: "w_001".to_string(),
            name: "Kim".to_string(),
            branch_id: "main".to_string(),
            hourly_rate: HourlyRateComposition::default(),
            support_pay: None,
            phone: None,
            bank_account: None,
        });
        for d in days {
            store.set_fixed_shift(FixedShiftEntry {
                worker_id: "w_001".to_string(),
                month: "2025-03".to_string(),
                weekday: day(*d).weekday(),
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            });
        }
        store
    }

    #[test]
    fn test_clock_in_then_out_appends_closed_log() {
        let config = ConfigLoader::default();
        let mut store = store_with_shift_on(&[4]);

        let outcome = clock_in(&mut store, &config, "w_001", at(4, 9, 0)).unwrap();
        assert!(matches!(outcome, ClockInOutcome::Working { .. }));
        assert!(store.is_marked_working("w_001"));

        let outcome = clock_out(&mut store, &config, "w_001", at(4, 17, 30)).unwrap();
        assert!(matches!(
            outcome,
            ClockOutOutcome::Closed {
                duration_minutes: 510,
                ..
            }
        ));
        assert!(store.working_session("w_001").is_none());
        assert!(!store.is_marked_working("w_001"));

        let logs = store.attendance_logs("w_001");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind, LogKind::Closed);
    }

    #[test]
    fn test_unscheduled_clock_in_twice_leaves_nothing_pending() {
        let config = ConfigLoader::default();
        let mut store = store_with_shift_on(&[]);

        let first = clock_in(&mut store, &config, "w_001", at(4, 9, 0)).unwrap();
        assert!(matches!(
            first,
            ClockInOutcome::PendingApproval {
                kind: RequestKind::UnscheduledWork,
                ..
            }
        ));
        assert_eq!(store.pending_requests().len(), 1);

        let second = clock_in(&mut store, &config, "w_001", at(4, 9, 1)).unwrap();
        assert!(matches!(second, ClockInOutcome::RequestCancelled { .. }));
        assert!(store.pending_requests().is_empty());
    }

    #[test]
    fn test_two_absences_suspend_then_third_attempt_fails() {
        let config = ConfigLoader::default();
        // 4th and 5th March are Tuesday and Wednesday
        let mut store = store_with_shift_on(&[4, 5]);

        clock_in(&mut store, &config, "w_001", at(4, 9, 16)).unwrap();
        assert!(store.no_show_locked("w_001", day(4)));
        assert_eq!(store.discipline("w_001").absence_count, 1);

        let second = clock_in(&mut store, &config, "w_001", at(5, 10, 0)).unwrap();
        assert_eq!(
            second,
            ClockInOutcome::MarkedAbsent {
                absence_count: 2,
                suspended: true
            }
        );
        assert_eq!(
            store.discipline("w_001"),
            DisciplineStatus {
                absence_count: 2,
                suspended: true
            }
        );
        assert!(store
            .pending_requests()
            .iter()
            .any(|r| r.kind() == RequestKind::Report));

        let third = clock_in(&mut store, &config, "w_001", at(5, 9, 0));
        assert!(matches!(third, Err(EngineError::Suspended { .. })));
    }

    #[test]
    fn test_lock_does_not_carry_to_next_day() {
        let config = ConfigLoader::default();
        let mut store = store_with_shift_on(&[4, 5]);

        clock_in(&mut store, &config, "w_001", at(4, 9, 30)).unwrap();
        let locked = clock_in(&mut store, &config, "w_001", at(4, 9, 31)).unwrap();
        assert!(matches!(
            locked,
            ClockInOutcome::PendingApproval {
                kind: RequestKind::NoShowOverride,
                ..
            }
        ));

        let next_day = clock_in(&mut store, &config, "w_001", at(5, 9, 0)).unwrap();
        assert!(matches!(next_day, ClockInOutcome::Working { .. }));
    }

    #[test]
    fn test_unknown_worker() {
        let config = ConfigLoader::default();
        let mut store = InMemoryStore::new();
        let result = clock_in(&mut store, &config, "ghost", at(4, 9, 0));
        assert!(matches!(result, Err(EngineError::WorkerNotFound { .. })));
    }
}
