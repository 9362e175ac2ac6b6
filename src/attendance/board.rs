//! The administrator board: what the periodic refresh polls.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::models::{ExceptionRequest, WorkingSession};
use crate::store::Repository;

use super::review::archive_view;

/// A point-in-time view of requests and active sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminBoard {
    /// When the board was read.
    pub generated_at: NaiveDateTime,
    /// Requests awaiting a decision, oldest first.
    pub pending: Vec<ExceptionRequest>,
    /// Resolved requests still inside the retention window, newest first.
    pub archive: Vec<ExceptionRequest>,
    /// Workers currently on shift.
    pub working: Vec<WorkingSession>,
}

/// Reads the administrator board.
pub fn admin_board<R: Repository + ?Sized>(
    repo: &R,
    policy: &PolicyConfig,
    now: NaiveDateTime,
) -> AdminBoard {
    AdminBoard {
        generated_at: now,
        pending: repo.pending_requests(),
        archive: archive_view(&repo.archived_requests(), now, policy.archive_retention()),
        working: repo.working_sessions(),
    }
}
