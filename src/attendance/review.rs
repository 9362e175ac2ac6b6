//! Administrator review of exception requests.
//!
//! Approval applies the request's effects and archives it in the same
//! delta. Rejection only archives. Restore re-files an archived request
//! under a fresh id.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    DisciplineStatus, ExceptionRequest, ExpenseClaim, RequestId, RequestKind, RequestPayload,
    RequestStatus, WorkingSession, minutes_between,
};
use crate::store::{Change, LogTarget, Repository, StateDelta};

/// The effect an approval had on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ApprovalEffect {
    /// A session opened as of approval time.
    SessionOpened,
    /// The worker already had a session; nothing opened.
    SessionAlreadyOpen,
    /// The no-show lock was lifted.
    LockCleared {
        /// Whether a late session opened along with it.
        session_opened: bool,
    },
    /// The targeted log was rewritten.
    LogCorrected {
        /// Duration recomputed from the corrected times.
        duration_minutes: i64,
    },
    /// No log matched the correction; nothing changed.
    CorrectionTargetMissing,
    /// The claim is now visible to payroll.
    ExpenseRecorded,
    /// These profile fields were applied.
    ProfileUpdated {
        /// Applied field names.
        fields: Vec<String>,
    },
    /// Informational request; nothing to apply.
    Acknowledged,
}

/// An archived request and what its approval did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// The request as archived.
    pub request: ExceptionRequest,
    /// Effect of the approval, `None` for rejections.
    pub effect: Option<ApprovalEffect>,
}

fn find_pending<R: Repository + ?Sized>(
    repo: &R,
    request_id: RequestId,
) -> EngineResult<ExceptionRequest> {
    repo.pending_requests()
        .into_iter()
        .find(|r| r.id == request_id)
        .ok_or(EngineError::RequestNotFound { request_id })
}

/// Approves a pending request, applying its effects.
///
/// A time correction whose target log cannot be found is archived as
/// approved without changing any log. Requests that would open a session
/// are refused while the worker is suspended.
pub fn approve_request<R: Repository + ?Sized>(
    repo: &mut R,
    request_id: RequestId,
    now: NaiveDateTime,
) -> EngineResult<ReviewOutcome> {
    let request = find_pending(repo, request_id)?;
    let mut delta = StateDelta::default();
    let effect = approval_effect(repo, &request, now, &mut delta)?;

    let archived = request.resolved(RequestStatus::Approved, now);
    delta.push(Change::ArchiveRequest(archived.clone()));
    repo.commit(delta)?;

    info!(
        request_id,
        worker_id = %archived.worker_id,
        kind = ?archived.kind(),
        ?effect,
        "Request approved"
    );
    Ok(ReviewOutcome {
        request: archived,
        effect: Some(effect),
    })
}

fn approval_effect<R: Repository + ?Sized>(
    repo: &R,
    request: &ExceptionRequest,
    now: NaiveDateTime,
    delta: &mut StateDelta,
) -> EngineResult<ApprovalEffect> {
    let worker_id = request.worker_id.as_str();

    let opens_session = matches!(
        request.payload,
        RequestPayload::UnscheduledWork { .. } | RequestPayload::NoShowOverride { .. }
    );
    if opens_session && repo.discipline(worker_id).suspended {
        warn!(
            request_id = request.id,
            worker_id = %worker_id,
            "Refusing approval for suspended worker"
        );
        return Err(EngineError::Suspended {
            worker_id: worker_id.to_string(),
        });
    }

    let effect = match &request.payload {
        RequestPayload::UnscheduledWork { .. } => {
            if repo.working_session(worker_id).is_some() {
                warn!(worker_id = %worker_id, "Unscheduled work approved while already working");
                ApprovalEffect::SessionAlreadyOpen
            } else {
                open_session(repo, worker_id, now, false, true, delta)?;
                ApprovalEffect::SessionOpened
            }
        }
        RequestPayload::NoShowOverride { date } => {
            delta.push(Change::SetNoShowLock {
                worker_id: worker_id.to_string(),
                date: *date,
                locked: false,
            });
            let session_opened =
                *date == now.date() && repo.working_session(worker_id).is_none();
            if session_opened {
                open_session(repo, worker_id, now, true, false, delta)?;
            }
            ApprovalEffect::LockCleared { session_opened }
        }
        RequestPayload::TimeCorrection {
            log_id,
            date,
            start_time,
            end_time,
            ..
        } => {
            let logs = repo.attendance_logs(worker_id);
            let target = match log_id {
                Some(id) => logs
                    .iter()
                    .any(|log| log.id == Some(*id))
                    .then_some(LogTarget::Id(*id)),
                None => logs
                    .iter()
                    .any(|log| log.date == *date)
                    .then_some(LogTarget::Date(*date)),
            };

            match target {
                Some(target) => {
                    let duration_minutes = minutes_between(*start_time, *end_time);
                    delta.push(Change::CorrectLog {
                        worker_id: worker_id.to_string(),
                        target,
                        start_time: *start_time,
                        end_time: *end_time,
                        duration_minutes,
                    });
                    ApprovalEffect::LogCorrected { duration_minutes }
                }
                None => {
                    warn!(
                        worker_id = %worker_id,
                        %date,
                        ?log_id,
                        "Time correction matched no log, skipping"
                    );
                    ApprovalEffect::CorrectionTargetMissing
                }
            }
        }
        RequestPayload::ExpenseClaim {
            date,
            amount,
            category,
            ..
        } => {
            delta.push(Change::AddExpenseClaim(ExpenseClaim {
                request_id: Some(request.id),
                worker_id: worker_id.to_string(),
                date: *date,
                amount: *amount,
                category: category.clone(),
            }));
            ApprovalEffect::ExpenseRecorded
        }
        RequestPayload::ProfileEdit { changes } => {
            let mut worker = repo
                .worker(worker_id)
                .ok_or_else(|| EngineError::WorkerNotFound {
                    worker_id: worker_id.to_string(),
                })?;
            let mut fields = Vec::new();
            for (field, value) in changes {
                if worker.apply_profile_change(field, value) {
                    fields.push(field.clone());
                } else {
                    warn!(worker_id = %worker_id, %field, "Ignoring unknown profile field");
                }
            }
            delta.push(Change::UpdateWorker(worker));
            ApprovalEffect::ProfileUpdated { fields }
        }
        RequestPayload::Report { .. } => ApprovalEffect::Acknowledged,
    };

    Ok(effect)
}

fn open_session<R: Repository + ?Sized>(
    repo: &R,
    worker_id: &str,
    now: NaiveDateTime,
    is_late: bool,
    is_unscheduled: bool,
    delta: &mut StateDelta,
) -> EngineResult<()> {
    let worker = repo
        .worker(worker_id)
        .ok_or_else(|| EngineError::WorkerNotFound {
            worker_id: worker_id.to_string(),
        })?;

    delta.push(Change::OpenSession(WorkingSession {
        worker_id: worker_id.to_string(),
        branch_id: worker.branch_id,
        started_at: now,
        is_late,
        is_unscheduled,
        is_sub: false,
    }));
    delta.push(Change::SetWorkingMarker {
        worker_id: worker_id.to_string(),
        working: true,
    });
    Ok(())
}

/// Rejects a pending request. Nothing but the archive changes.
pub fn reject_request<R: Repository + ?Sized>(
    repo: &mut R,
    request_id: RequestId,
    now: NaiveDateTime,
) -> EngineResult<ReviewOutcome> {
    let request = find_pending(repo, request_id)?;
    let archived = request.resolved(RequestStatus::Rejected, now);

    let mut delta = StateDelta::default();
    delta.push(Change::ArchiveRequest(archived.clone()));
    repo.commit(delta)?;

    info!(request_id, worker_id = %archived.worker_id, "Request rejected");
    Ok(ReviewOutcome {
        request: archived,
        effect: None,
    })
}

/// Moves an archived request back to pending under a fresh id.
///
/// Unscheduled-work and no-show-override requests are refused with a
/// validation error when the worker already has one pending for that date.
/// Claims minted by an approved expense request are withdrawn from payroll.
/// Other approval effects stay in place.
pub fn restore_request<R: Repository + ?Sized>(
    repo: &mut R,
    request_id: RequestId,
    now: NaiveDateTime,
) -> EngineResult<ExceptionRequest> {
    let archived = repo
        .archived_requests()
        .into_iter()
        .find(|r| r.id == request_id)
        .ok_or(EngineError::RequestNotFound { request_id })?;

    if let Some(date) = archived.payload.date() {
        let kind = archived.kind();
        let once_per_day = matches!(
            kind,
            RequestKind::UnscheduledWork | RequestKind::NoShowOverride
        );
        if once_per_day
            && repo
                .pending_requests()
                .iter()
                .any(|r| r.is_pending_for(&archived.worker_id, kind, date))
        {
            return Err(EngineError::Validation {
                field: "request_id".to_string(),
                message: format!(
                    "worker {} already has a pending {:?} request for {}",
                    archived.worker_id, kind, date
                ),
            });
        }
    }

    let restored = ExceptionRequest::pending(
        repo.next_request_id(),
        archived.worker_id.clone(),
        now,
        archived.payload.clone(),
    );

    let mut delta = StateDelta::default();
    delta.push(Change::UnarchiveRequest { request_id });
    if matches!(archived.payload, RequestPayload::ExpenseClaim { .. })
        && archived.status == RequestStatus::Approved
    {
        delta.push(Change::RemoveExpenseClaim { request_id });
    }
    delta.push(Change::FileRequest(restored.clone()));
    repo.commit(delta)?;

    info!(
        old_id = request_id,
        new_id = restored.id,
        worker_id = %restored.worker_id,
        "Request restored"
    );
    Ok(restored)
}

/// Archived requests resolved within the retention window, newest first.
///
/// Expired entries are hidden, not purged.
pub fn archive_view(
    archived: &[ExceptionRequest],
    now: NaiveDateTime,
    retention: chrono::Duration,
) -> Vec<ExceptionRequest> {
    let cutoff = now - retention;
    let mut visible: Vec<ExceptionRequest> = archived
        .iter()
        .filter(|r| r.resolved_at.unwrap_or(r.requested_at) >= cutoff)
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.id.cmp(&a.id));
    visible
}

/// Resets a worker's absence count and lifts the suspension.
pub fn clear_discipline<R: Repository + ?Sized>(
    repo: &mut R,
    worker_id: &str,
) -> EngineResult<DisciplineStatus> {
    if repo.worker(worker_id).is_none() {
        return Err(EngineError::WorkerNotFound {
            worker_id: worker_id.to_string(),
        });
    }

    let previous = repo.discipline(worker_id);
    let mut delta = StateDelta::default();
    delta.push(Change::SetDiscipline {
        worker_id: worker_id.to_string(),
        status: DisciplineStatus::default(),
    });
    repo.commit(delta)?;

    info!(
        worker_id = %worker_id,
        previous_count = previous.absence_count,
        "Discipline cleared"
    );
    Ok(DisciplineStatus::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceLog, HourlyRateComposition, LogKind, Worker};
    use crate::store::InMemoryStore;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        today().and_hms_opt(h, m, 0).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn store() -> InMemoryStore {
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
        store
    }

    fn file(store: &mut InMemoryStore, payload: RequestPayload) -> RequestId {
        let id = store.next_request_id();
        let mut delta = StateDelta::default();
        delta.push(Change::FileRequest(ExceptionRequest::pending(
            id,
            "w_001",
            at(8, 0),
            payload,
        )));
        store.commit(delta).unwrap();
        id
    }

    fn night_log(id: Option<uuid::Uuid>) -> AttendanceLog {
        AttendanceLog {
            id,
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            kind: LogKind::Closed,
            date: today(),
            start_time: Some(time(22, 0)),
            end_time: Some(time(23, 0)),
            duration_minutes: 60,
            is_late: false,
            is_no_show_late: false,
            is_unscheduled: false,
            is_sub: false,
        }
    }

    #[test]
    fn test_unscheduled_approval_opens_flagged_session() {
        let mut store = store();
        let id = file(&mut store, RequestPayload::UnscheduledWork { date: today() });

        let outcome = approve_request(&mut store, id, at(10, 0)).unwrap();
        assert_eq!(outcome.effect, Some(ApprovalEffect::SessionOpened));
        assert_eq!(outcome.request.status, RequestStatus::Approved);

        let session = store.working_session("w_001").unwrap();
        assert!(session.is_unscheduled);
        assert_eq!(session.started_at, at(10, 0));
        assert!(store.is_marked_working("w_001"));
        assert!(store.pending_requests().is_empty());
        assert_eq!(store.archived_requests().len(), 1);
    }

    #[test]
    fn test_time_correction_wraps_past_midnight() {
        let mut store = store();
        let log_id = uuid::Uuid::new_v4();
        store.append_log(night_log(Some(log_id)));
        let id = file(
            &mut store,
            RequestPayload::TimeCorrection {
                log_id: Some(log_id),
                date: today(),
                start_time: time(23, 30),
                end_time: time(0, 15),
                reason: "forgot to clock out".to_string(),
            },
        );

        let outcome = approve_request(&mut store, id, at(12, 0)).unwrap();
        assert_eq!(
            outcome.effect,
            Some(ApprovalEffect::LogCorrected {
                duration_minutes: 45
            })
        );
        let log = &store.attendance_logs("w_001")[0];
        assert_eq!(log.duration_minutes, 45);
        assert_eq!(log.start_time, Some(time(23, 30)));
    }

    #[test]
    fn test_time_correction_by_date_when_no_id() {
        let mut store = store();
        store.append_log(night_log(None));
        let id = file(
            &mut store,
            RequestPayload::TimeCorrection {
                log_id: None,
                date: today(),
                start_time: time(21, 0),
                end_time: time(23, 0),
                reason: String::new(),
            },
        );

        approve_request(&mut store, id, at(12, 0)).unwrap();
        assert_eq!(store.attendance_logs("w_001")[0].duration_minutes, 120);
    }

    #[test]
    fn test_time_correction_without_target_still_archives() {
        let mut store = store();
        let id = file(
            &mut store,
            RequestPayload::TimeCorrection {
                log_id: None,
                date: today(),
                start_time: time(9, 0),
                end_time: time(18, 0),
                reason: String::new(),
            },
        );

        let outcome = approve_request(&mut store, id, at(12, 0)).unwrap();
        assert_eq!(outcome.effect, Some(ApprovalEffect::CorrectionTargetMissing));
        assert!(store.pending_requests().is_empty());
        assert!(store.attendance_logs("w_001").is_empty());
    }

    #[test]
    fn test_no_show_override_clears_lock_and_opens_late_session() {
        let mut store = store();
        let mut delta = StateDelta::default();
        delta.push(Change::SetNoShowLock {
            worker_id: "w_001".to_string(),
            date: today(),
            locked: true,
        });
        store.commit(delta).unwrap();
        let id = file(&mut store, RequestPayload::NoShowOverride { date: today() });

        let outcome = approve_request(&mut store, id, at(9, 40)).unwrap();
        assert_eq!(
            outcome.effect,
            Some(ApprovalEffect::LockCleared {
                session_opened: true
            })
        );
        assert!(!store.no_show_locked("w_001", today()));
        assert!(store.working_session("w_001").unwrap().is_late);
    }

    #[test]
    fn test_time_correction_by_date_skips_absence_row() {
        let mut store = store();
        store.append_log(AttendanceLog {
            kind: LogKind::Absent,
            start_time: None,
            end_time: None,
            duration_minutes: 0,
            is_no_show_late: true,
            ..night_log(Some(uuid::Uuid::new_v4()))
        });
        store.append_log(AttendanceLog {
            start_time: Some(time(9, 40)),
            end_time: Some(time(17, 0)),
            duration_minutes: 440,
            is_late: true,
            ..night_log(Some(uuid::Uuid::new_v4()))
        });
        let id = file(
            &mut store,
            RequestPayload::TimeCorrection {
                log_id: None,
                date: today(),
                start_time: time(9, 0),
                end_time: time(18, 0),
                reason: String::new(),
            },
        );

        approve_request(&mut store, id, at(19, 0)).unwrap();

        let logs = store.attendance_logs("w_001");
        assert_eq!(logs[0].kind, LogKind::Absent);
        assert_eq!(logs[0].duration_minutes, 0);
        assert_eq!(logs[0].start_time, None);
        assert_eq!(logs[1].kind, LogKind::Closed);
        assert_eq!(logs[1].duration_minutes, 540);
        assert_eq!(logs[1].start_time, Some(time(9, 0)));
    }

    #[test]
    fn test_suspended_worker_cannot_be_approved_into_a_session() {
        let mut store = store();
        let id = file(&mut store, RequestPayload::UnscheduledWork { date: today() });
        store.set_discipline(
            "w_001",
            DisciplineStatus {
                absence_count: 2,
                suspended: true,
            },
        );

        let err = approve_request(&mut store, id, at(10, 0)).unwrap_err();
        assert!(matches!(err, EngineError::Suspended { .. }));
        assert!(store.working_session("w_001").is_none());
        assert_eq!(store.pending_requests()[0].id, id);
    }

    #[test]
    fn test_restore_refuses_second_pending_unscheduled_request() {
        let mut store = store();
        let first = file(&mut store, RequestPayload::UnscheduledWork { date: today() });
        reject_request(&mut store, first, at(8, 30)).unwrap();
        let second = file(&mut store, RequestPayload::UnscheduledWork { date: today() });

        let err = restore_request(&mut store, first, at(9, 0)).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));

        let pending = store.pending_requests();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);
        assert_eq!(store.archived_requests()[0].id, first);
    }

    #[test]
    fn test_restore_unscheduled_request_for_other_date_is_allowed() {
        let mut store = store();
        let first = file(&mut store, RequestPayload::UnscheduledWork { date: today() });
        reject_request(&mut store, first, at(8, 30)).unwrap();
        file(
            &mut store,
            RequestPayload::UnscheduledWork {
                date: today().succ_opt().unwrap(),
            },
        );

        let restored = restore_request(&mut store, first, at(9, 0)).unwrap();
        assert_eq!(store.pending_requests().len(), 2);
        assert_eq!(restored.status, RequestStatus::Pending);
    }

    #[test]
    fn test_expense_approval_and_restore() {
        let mut store = store();
        let id = file(
            &mut store,
            RequestPayload::ExpenseClaim {
                date: today(),
                amount: Decimal::new(12000, 0),
                category: "transport".to_string(),
                memo: String::new(),
            },
        );

        approve_request(&mut store, id, at(12, 0)).unwrap();
        assert_eq!(store.approved_expense_claims("w_001").len(), 1);

        let restored = restore_request(&mut store, id, at(13, 0)).unwrap();
        assert_ne!(restored.id, id);
        assert_eq!(restored.status, RequestStatus::Pending);
        assert_eq!(restored.requested_at, at(13, 0));
        assert!(store.approved_expense_claims("w_001").is_empty());
        assert!(store.archived_requests().is_empty());
        assert_eq!(store.pending_requests()[0].id, restored.id);
    }

    #[test]
    fn test_profile_edit_applies_known_fields() {
        let mut store = store();
        let mut changes = BTreeMap::new();
        changes.insert("phone".to_string(), "010-1234-5678".to_string());
        changes.insert("shoe_size".to_string(), "270".to_string());
        let id = file(&mut store, RequestPayload::ProfileEdit { changes });

        let outcome = approve_request(&mut store, id, at(12, 0)).unwrap();
        assert_eq!(
            outcome.effect,
            Some(ApprovalEffect::ProfileUpdated {
                fields: vec!["phone".to_string()]
            })
        );
        assert_eq!(
            store.worker("w_001").unwrap().phone.as_deref(),
            Some("010-1234-5678")
        );
    }

    #[test]
    fn test_reject_only_archives() {
        let mut store = store();
        let id = file(&mut store, RequestPayload::UnscheduledWork { date: today() });

        let outcome = reject_request(&mut store, id, at(10, 0)).unwrap();
        assert_eq!(outcome.request.status, RequestStatus::Rejected);
        assert_eq!(outcome.effect, None);
        assert!(store.working_session("w_001").is_none());
    }

    #[test]
    fn test_unknown_request() {
        let mut store = store();
        assert!(matches!(
            approve_request(&mut store, 99, at(10, 0)),
            Err(EngineError::RequestNotFound { request_id: 99 })
        ));
        assert!(matches!(
            restore_request(&mut store, 99, at(10, 0)),
            Err(EngineError::RequestNotFound { .. })
        ));
    }

    #[test]
    fn test_archive_view_hides_expired_entries() {
        let base = ExceptionRequest::pending(
            1,
            "w_001",
            at(8, 0),
            RequestPayload::UnscheduledWork { date: today() },
        );
        let old = base.resolved(RequestStatus::Approved, at(9, 0) - Duration::days(21));
        let recent = ExceptionRequest {
            id: 2,
            ..base.resolved(RequestStatus::Rejected, at(9, 0) - Duration::days(3))
        };

        let view = archive_view(&[old, recent], at(9, 0), Duration::days(20));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 2);
    }

    #[test]
    fn test_clear_discipline() {
        let mut store = store();
        store.set_discipline(
            "w_001",
            DisciplineStatus {
                absence_count: 2,
                suspended: true,
            },
        );

        clear_discipline(&mut store, "w_001").unwrap();
        assert_eq!(store.discipline("w_001"), DisciplineStatus::default());
        assert!(clear_discipline(&mut store, "ghost").is_err());
    }
}
