//! Pure clock-in/clock-out transitions.
//!
//! [`WorkerSnapshot::read`] captures everything a transition needs from the
//! store. [`apply_transition`] turns a snapshot and an event into an outcome
//! plus a [`StateDelta`]; nothing is written until the caller commits it.
//!
//! Clock-in branches are evaluated in a fixed order:
//!
//! 1. suspended workers are refused with [`EngineError::Suspended`],
//! 2. a no-show lock for today toggles a no-show-override request,
//! 3. an already open session is left alone,
//! 4. no scheduled shift, or arriving before the early grace window, toggles
//!    an unscheduled-work request,
//! 5. arriving after the late grace window records an absence,
//! 6. anything else opens a session, late from `start + late_after`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceLog, DisciplineStatus, ExceptionRequest, LogKind, RequestId, RequestKind,
    RequestPayload, Worker, WorkingSession,
};
use crate::store::{Change, Repository, StateDelta};

use super::schedule::{ScheduledShift, scheduled_shift};
use super::toggle::{ToggleResult, toggle_or_create_exception_request};

/// The state a transition reads, captured at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSnapshot {
    /// The worker.
    pub worker: Worker,
    /// Current discipline status.
    pub discipline: DisciplineStatus,
    /// Whether today is locked by a missed shift.
    pub no_show_locked: bool,
    /// The open session, if any.
    pub session: Option<WorkingSession>,
    /// The liveness flag.
    pub marked_working: bool,
    /// Today's scheduled shift, if any.
    pub scheduled: Option<ScheduledShift>,
    /// Every pending request in the store.
    pub pending: Vec<ExceptionRequest>,
    /// Id a newly filed request takes.
    pub next_request_id: RequestId,
}

impl WorkerSnapshot {
    /// Reads the worker's state for the day of `now`.
    pub fn read<R: Repository + ?Sized>(
        repo: &R,
        worker_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<Self> {
        let worker = repo
            .worker(worker_id)
            .ok_or_else(|| EngineError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            })?;
        let today = now.date();

        Ok(Self {
            discipline: repo.discipline(worker_id),
            no_show_locked: repo.no_show_locked(worker_id, today),
            session: repo.working_session(worker_id),
            marked_working: repo.is_marked_working(worker_id),
            scheduled: scheduled_shift(repo, worker_id, today),
            pending: repo.pending_requests(),
            next_request_id: repo.next_request_id(),
            worker,
        })
    }
}

/// Result of a clock-in attempt that was not refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClockInOutcome {
    /// A session opened.
    Working {
        /// Arrived at or after `start + late_after`.
        is_late: bool,
        /// The shift is a one-off substitute shift.
        is_sub: bool,
    },
    /// A request was filed; no session opened.
    PendingApproval {
        /// The new request.
        request_id: RequestId,
        /// Unscheduled work or no-show override.
        kind: RequestKind,
    },
    /// A repeat clock-in withdrew the pending request.
    RequestCancelled {
        /// The withdrawn request.
        request_id: RequestId,
        /// Unscheduled work or no-show override.
        kind: RequestKind,
    },
    /// Arrived after the late grace window; an absence was recorded.
    MarkedAbsent {
        /// Absences after this one.
        absence_count: u32,
        /// Whether this absence suspended the worker.
        suspended: bool,
    },
    /// A session is already open.
    AlreadyWorking,
}

/// Result of a clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClockOutOutcome {
    /// The session was closed into a log.
    Closed {
        /// Id of the new log.
        log_id: Uuid,
        /// Worked minutes.
        duration_minutes: i64,
    },
    /// There was no session to close.
    NotWorking,
}

/// An attendance event driven by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceEvent {
    /// The worker pressed clock-in.
    ClockIn,
    /// The worker pressed clock-out.
    ClockOut,
}

/// Outcome of either attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionOutcome {
    /// Outcome of a clock-in.
    ClockIn(ClockInOutcome),
    /// Outcome of a clock-out.
    ClockOut(ClockOutOutcome),
}

/// An outcome together with the changes that realise it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<O> {
    /// What happened.
    pub outcome: O,
    /// Changes to commit.
    pub delta: StateDelta,
}

impl<O> Transition<O> {
    /// Maps the outcome, keeping the delta.
    pub fn map<U>(self, f: impl FnOnce(O) -> U) -> Transition<U> {
        Transition {
            outcome: f(self.outcome),
            delta: self.delta,
        }
    }
}

/// Computes the transition for `event` without touching any store.
pub fn apply_transition(
    snapshot: &WorkerSnapshot,
    policy: &PolicyConfig,
    event: AttendanceEvent,
    now: NaiveDateTime,
) -> EngineResult<Transition<TransitionOutcome>> {
    match event {
        AttendanceEvent::ClockIn => Ok(clock_in_transition(snapshot, policy, now)?
            .map(TransitionOutcome::ClockIn)),
        AttendanceEvent::ClockOut => {
            Ok(clock_out_transition(snapshot, now).map(TransitionOutcome::ClockOut))
        }
    }
}

/// Computes a clock-in.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use shift_ledger::attendance::{
///     ClockInOutcome, ScheduleSource, ScheduledShift, WorkerSnapshot, clock_in_transition,
/// };
/// use shift_ledger::config::PolicyConfig;
/// use shift_ledger::models::{DisciplineStatus, ShiftWindow, Worker};
///
/// let snapshot = WorkerSnapshot {
///     worker: Worker {
///         id: "w_001".to_string(),
///         name: "Kim".to_string(),
///         branch_id: "main".to_string(),
///         hourly_rate: Default::default(),
///         support_pay: None,
///         phone: None,
///         bank_account: None,
///     },
///     discipline: DisciplineStatus::default(),
///     no_show_locked: false,
///     session: None,
///     marked_working: false,
///     scheduled: Some(ScheduledShift {
///         window: ShiftWindow {
///             start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///             end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///         },
///         source: ScheduleSource::Fixed,
///     }),
///     pending: Vec::new(),
///     next_request_id: 1,
/// };
/// let now = NaiveDate::from_ymd_opt(2025, 3, 4)
///     .unwrap()
///     .and_hms_opt(9, 1, 0)
///     .unwrap();
///
/// let transition = clock_in_transition(&snapshot, &PolicyConfig::default(), now).unwrap();
/// assert_eq!(
///     transition.outcome,
///     ClockInOutcome::Working { is_late: true, is_sub: false }
/// );
/// ```
pub fn clock_in_transition(
    snapshot: &WorkerSnapshot,
    policy: &PolicyConfig,
    now: NaiveDateTime,
) -> EngineResult<Transition<ClockInOutcome>> {
    let worker_id = snapshot.worker.id.as_str();

    if snapshot.discipline.suspended {
        return Err(EngineError::Suspended {
            worker_id: worker_id.to_string(),
        });
    }

    if snapshot.no_show_locked {
        return Ok(toggle(snapshot, RequestKind::NoShowOverride, now));
    }

    if snapshot.session.is_some() {
        return Ok(Transition {
            outcome: ClockInOutcome::AlreadyWorking,
            delta: StateDelta::default(),
        });
    }

    let Some(shift) = snapshot.scheduled else {
        debug!(worker_id = %worker_id, "No scheduled shift today");
        return Ok(toggle(snapshot, RequestKind::UnscheduledWork, now));
    };

    let start = now.date().and_time(shift.window.start);

    if now < start - policy.early_grace() {
        debug!(worker_id = %worker_id, %start, "Clock-in before the early grace window");
        return Ok(toggle(snapshot, RequestKind::UnscheduledWork, now));
    }

    if now > start + policy.late_grace() {
        return Ok(mark_absent(snapshot, policy, now));
    }

    let is_late = now >= start + policy.late_after();
    let is_sub = shift.is_sub();
    let mut delta = StateDelta::default();

    delta.push(Change::OpenSession(WorkingSession {
        worker_id: worker_id.to_string(),
        branch_id: snapshot.worker.branch_id.clone(),
        started_at: now,
        is_late,
        is_unscheduled: false,
        is_sub,
    }));
    delta.push(Change::SetWorkingMarker {
        worker_id: worker_id.to_string(),
        working: true,
    });
    for stale in snapshot
        .pending
        .iter()
        .filter(|r| r.is_pending_for(worker_id, RequestKind::NoShowOverride, now.date()))
    {
        delta.push(Change::WithdrawRequest {
            request_id: stale.id,
        });
    }

    Ok(Transition {
        outcome: ClockInOutcome::Working { is_late, is_sub },
        delta,
    })
}

/// Computes a clock-out.
///
/// The log is dated on the closing day and its duration is never negative.
pub fn clock_out_transition(
    snapshot: &WorkerSnapshot,
    now: NaiveDateTime,
) -> Transition<ClockOutOutcome> {
    let worker_id = snapshot.worker.id.clone();
    let mut delta = StateDelta::default();

    let Some(session) = &snapshot.session else {
        if snapshot.marked_working {
            delta.push(Change::SetWorkingMarker {
                worker_id,
                working: false,
            });
        }
        return Transition {
            outcome: ClockOutOutcome::NotWorking,
            delta,
        };
    };

    let duration_minutes = (now - session.started_at).num_minutes().max(0);
    let log_id = Uuid::new_v4();

    delta.push(Change::AppendLog(AttendanceLog {
        id: Some(log_id),
        worker_id: worker_id.clone(),
        branch_id: session.branch_id.clone(),
        kind: LogKind::Closed,
        date: now.date(),
        start_time: Some(session.started_at.time()),
        end_time: Some(now.time()),
        duration_minutes,
        is_late: session.is_late,
        is_no_show_late: false,
        is_unscheduled: session.is_unscheduled,
        is_sub: session.is_sub,
    }));
    delta.push(Change::CloseSession {
        worker_id: worker_id.clone(),
    });
    delta.push(Change::SetWorkingMarker {
        worker_id,
        working: false,
    });

    Transition {
        outcome: ClockOutOutcome::Closed {
            log_id,
            duration_minutes,
        },
        delta,
    }
}

fn toggle(
    snapshot: &WorkerSnapshot,
    kind: RequestKind,
    now: NaiveDateTime,
) -> Transition<ClockInOutcome> {
    let mut delta = StateDelta::default();
    let result = toggle_or_create_exception_request(
        &snapshot.pending,
        &snapshot.worker.id,
        kind,
        now,
        snapshot.next_request_id,
        &mut delta,
    );

    let outcome = match result {
        ToggleResult::Created { request_id } => ClockInOutcome::PendingApproval { request_id, kind },
        ToggleResult::Cancelled { request_id } => {
            ClockInOutcome::RequestCancelled { request_id, kind }
        }
    };
    Transition { outcome, delta }
}

fn mark_absent(
    snapshot: &WorkerSnapshot,
    policy: &PolicyConfig,
    now: NaiveDateTime,
) -> Transition<ClockInOutcome> {
    let worker_id = snapshot.worker.id.as_str();
    let today = now.date();
    let absence_count = snapshot.discipline.absence_count + 1;
    let suspended = absence_count >= policy.discipline_threshold;
    let mut delta = StateDelta::default();

    delta.push(Change::AppendLog(AttendanceLog {
        id: Some(Uuid::new_v4()),
        worker_id: worker_id.to_string(),
        branch_id: snapshot.worker.branch_id.clone(),
        kind: LogKind::Absent,
        date: today,
        start_time: None,
        end_time: None,
        duration_minutes: 0,
        is_late: false,
        is_no_show_late: true,
        is_unscheduled: false,
        is_sub: false,
    }));
    delta.push(Change::SetNoShowLock {
        worker_id: worker_id.to_string(),
        date: today,
        locked: true,
    });
    delta.push(Change::SetDiscipline {
        worker_id: worker_id.to_string(),
        status: DisciplineStatus {
            absence_count,
            suspended,
        },
    });

    if suspended {
        delta.push(Change::FileRequest(ExceptionRequest::pending(
            snapshot.next_request_id,
            worker_id,
            now,
            RequestPayload::Report {
                date: today,
                absence_count,
            },
        )));
    }

    Transition {
        outcome: ClockInOutcome::MarkedAbsent {
            absence_count,
            suspended,
        },
        delta,
    }
}
