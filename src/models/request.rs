//! Exception request models.
//!
//! Every worker-initiated item that needs an administrator decision is an
//! [`ExceptionRequest`]. The type-specific data lives in [`RequestPayload`].

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monotonic request identifier, also used as the sort key.
pub type RequestId = u64;

/// Resolution state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for an administrator.
    Pending,
    /// Approved; its effects have been applied.
    Approved,
    /// Rejected; no effects.
    Rejected,
}

/// Discriminant of [`RequestPayload`], handy for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Work without a schedule (or too early for the scheduled one).
    UnscheduledWork,
    /// Lift today's no-show lock.
    NoShowOverride,
    /// Rewrite the times of an attendance log.
    TimeCorrection,
    /// Reimburse an expense.
    ExpenseClaim,
    /// Change profile fields.
    ProfileEdit,
    /// Informational notice filed when a worker gets suspended.
    Report,
}

/// Type-specific request data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestPayload {
    /// Permission to work on `date` outside the schedule.
    UnscheduledWork {
        /// The day the worker wants to work.
        date: NaiveDate,
    },
    /// Lift the no-show lock for `date`.
    NoShowOverride {
        /// The locked day.
        date: NaiveDate,
    },
    /// Replace the times of a log.
    TimeCorrection {
        /// The targeted log, when known.
        #[serde(default)]
        log_id: Option<Uuid>,
        /// The date of the targeted log.
        date: NaiveDate,
        /// Corrected start time.
        start_time: NaiveTime,
        /// Corrected end time.
        end_time: NaiveTime,
        /// Free-text justification.
        #[serde(default)]
        reason: String,
    },
    /// Reimbursement for an expense incurred on `date`.
    ExpenseClaim {
        /// The day the expense was incurred.
        date: NaiveDate,
        /// Amount to reimburse.
        amount: Decimal,
        /// Expense category (e.g. "transport").
        category: String,
        /// Free-text note.
        #[serde(default)]
        memo: String,
    },
    /// Field name to new value.
    ProfileEdit {
        /// Requested changes.
        changes: BTreeMap<String, String>,
    },
    /// Suspension notice for administrators.
    Report {
        /// The day of the absence that triggered the suspension.
        date: NaiveDate,
        /// Absence count at the time of filing.
        absence_count: u32,
    },
}

impl RequestPayload {
    /// Returns the discriminant of this payload.
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestPayload::UnscheduledWork { .. } => RequestKind::UnscheduledWork,
            RequestPayload::NoShowOverride { .. } => RequestKind::NoShowOverride,
            RequestPayload::TimeCorrection { .. } => RequestKind::TimeCorrection,
            RequestPayload::ExpenseClaim { .. } => RequestKind::ExpenseClaim,
            RequestPayload::ProfileEdit { .. } => RequestKind::ProfileEdit,
            RequestPayload::Report { .. } => RequestKind::Report,
        }
    }

    /// The calendar date the request concerns, if it has one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RequestPayload::UnscheduledWork { date }
            | RequestPayload::NoShowOverride { date }
            | RequestPayload::TimeCorrection { date, .. }
            | RequestPayload::ExpenseClaim { date, .. }
            | RequestPayload::Report { date, .. } => Some(*date),
            RequestPayload::ProfileEdit { .. } => None,
        }
    }
}

/// A worker-initiated item awaiting (or past) administrator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRequest {
    /// Monotonic identifier.
    pub id: RequestId,
    /// The requesting worker.
    pub worker_id: String,
    /// Resolution state.
    pub status: RequestStatus,
    /// When the request was filed.
    pub requested_at: NaiveDateTime,
    /// When the request was approved or rejected.
    #[serde(default)]
    pub resolved_at: Option<NaiveDateTime>,
    /// Type-specific data.
    pub payload: RequestPayload,
}

impl ExceptionRequest {
    /// Creates a pending request.
    pub fn pending(
        id: RequestId,
        worker_id: impl Into<String>,
        requested_at: NaiveDateTime,
        payload: RequestPayload,
    ) -> Self {
        Self {
            id,
            worker_id: worker_id.into(),
            status: RequestStatus::Pending,
            requested_at,
            resolved_at: None,
            payload,
        }
    }

    /// Returns the discriminant of the payload.
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }

    /// True if this is a pending request of `kind` by `worker_id` for `date`.
    pub fn is_pending_for(&self, worker_id: &str, kind: RequestKind, date: NaiveDate) -> bool {
        self.status == RequestStatus::Pending
            && self.worker_id == worker_id
            && self.kind() == kind
            && self.payload.date() == Some(date)
    }

    /// Returns a copy marked with the given outcome.
    pub fn resolved(&self, status: RequestStatus, at: NaiveDateTime) -> Self {
        Self {
            status,
            resolved_at: Some(at),
            ..self.clone()
        }
    }
}
