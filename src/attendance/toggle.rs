//! Toggle semantics for worker-filed requests.
//!
//! Clocking in when approval is required files a request; clocking in again
//! while that request is still pending cancels it. Product owners should be
//! aware that a double tap therefore withdraws the request.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{ExceptionRequest, RequestId, RequestKind, RequestPayload};
use crate::store::{Change, StateDelta};

/// What [`toggle_or_create_exception_request`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ToggleResult {
    /// A new pending request was filed.
    Created {
        /// Id of the new request.
        request_id: RequestId,
    },
    /// An existing pending request was withdrawn.
    Cancelled {
        /// Id of the withdrawn request.
        request_id: RequestId,
    },
}

/// Withdraws the worker's pending request of `kind` for today, or files one.
///
/// Only `UnscheduledWork` and `NoShowOverride` requests are toggled; their
/// payload is just the date of `now`.
pub fn toggle_or_create_exception_request(
    pending: &[ExceptionRequest],
    worker_id: &str,
    kind: RequestKind,
    now: NaiveDateTime,
    next_request_id: RequestId,
    delta: &mut StateDelta,
) -> ToggleResult {
    let today = now.date();

    if let Some(existing) = pending
        .iter()
        .find(|r| r.is_pending_for(worker_id, kind, today))
    {
        delta.push(Change::WithdrawRequest {
            request_id: existing.id,
        });
        return ToggleResult::Cancelled {
            request_id: existing.id,
        };
    }

    let payload = match kind {
        RequestKind::NoShowOverride => RequestPayload::NoShowOverride { date: today },
        _ => RequestPayload::UnscheduledWork { date: today },
    };
    delta.push(Change::FileRequest(ExceptionRequest::pending(
        next_request_id,
        worker_id,
        now,
        payload,
    )));
    ToggleResult::Created {
        request_id: next_request_id,
    }
}
