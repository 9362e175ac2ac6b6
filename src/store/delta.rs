//! Batched state changes.
//!
//! Transitions never touch the store directly. They return a [`StateDelta`]
//! that the caller commits in one call, so a transition is applied in full
//! or not at all.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{
    AttendanceLog, DisciplineStatus, ExceptionRequest, ExpenseClaim, RequestId, Worker,
    WorkingSession,
};

/// How a time correction locates its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// The log with this id.
    Id(Uuid),
    /// The first non-absent log of the worker on this date, else the
    /// first absent one.
    Date(NaiveDate),
}

/// One mutation of the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Append an attendance log.
    AppendLog(AttendanceLog),
    /// Rewrite the times of an existing log.
    CorrectLog {
        /// Owner of the log.
        worker_id: String,
        /// Which log to rewrite.
        target: LogTarget,
        /// New start time.
        start_time: NaiveTime,
        /// New end time.
        end_time: NaiveTime,
        /// Duration recomputed from the new times.
        duration_minutes: i64,
    },
    /// Store the worker's open session.
    OpenSession(WorkingSession),
    /// Drop the worker's open session.
    CloseSession {
        /// Owner of the session.
        worker_id: String,
    },
    /// Set or clear the liveness flag the pay engine checks.
    SetWorkingMarker {
        /// The worker.
        worker_id: String,
        /// New flag value.
        working: bool,
    },
    /// Set or clear the no-show lock for a day.
    SetNoShowLock {
        /// The worker.
        worker_id: String,
        /// The locked day.
        date: NaiveDate,
        /// New lock value.
        locked: bool,
    },
    /// Replace the worker's discipline status.
    SetDiscipline {
        /// The worker.
        worker_id: String,
        /// New status.
        status: DisciplineStatus,
    },
    /// Add a pending request.
    FileRequest(ExceptionRequest),
    /// Drop a pending request without archiving it.
    WithdrawRequest {
        /// The request to drop.
        request_id: RequestId,
    },
    /// Move a request from pending to the archive, carrying its outcome.
    ArchiveRequest(ExceptionRequest),
    /// Remove a request from the archive.
    UnarchiveRequest {
        /// The request to remove.
        request_id: RequestId,
    },
    /// Make an approved claim visible to payroll.
    AddExpenseClaim(ExpenseClaim),
    /// Hide the claim approved from a request.
    RemoveExpenseClaim {
        /// The originating request.
        request_id: RequestId,
    },
    /// Replace a worker record.
    UpdateWorker(Worker),
}

/// An ordered batch of changes produced by one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    changes: Vec<Change>,
}

impl StateDelta {
    /// Appends a change to the batch.
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// The changes in application order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// True when the transition changes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes in the batch.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

impl IntoIterator for StateDelta {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl Extend<Change> for StateDelta {
    fn extend<T: IntoIterator<Item = Change>>(&mut self, iter: T) {
        self.changes.extend(iter);
    }
}
