//! The record store interface the core reads from and writes to.

use chrono::{NaiveDate, Weekday};

use crate::error::EngineResult;
use crate::models::{
    AttendanceLog, DisciplineStatus, ExceptionRequest, ExpenseClaim, HolidayRateTable,
    OneOffEntry, RequestId, ShiftWindow, Worker, WorkingSession,
};

use super::StateDelta;

/// Read access per entity plus a single batched write.
///
/// Reads return owned snapshots; callers compute a [`StateDelta`] from them
/// and hand it back through [`Repository::commit`].
pub trait Repository {
    /// Looks up a worker.
    fn worker(&self, worker_id: &str) -> Option<Worker>;

    /// Every attendance log of a worker, in insertion order.
    fn attendance_logs(&self, worker_id: &str) -> Vec<AttendanceLog>;

    /// The worker's open session, if any.
    fn working_session(&self, worker_id: &str) -> Option<WorkingSession>;

    /// Every open session.
    fn working_sessions(&self) -> Vec<WorkingSession>;

    /// The ephemeral liveness flag set at clock-in and cleared at clock-out.
    fn is_marked_working(&self, worker_id: &str) -> bool;

    /// True when the worker is locked out on `date`.
    fn no_show_locked(&self, worker_id: &str, date: NaiveDate) -> bool;

    /// The worker's discipline status (default when never recorded).
    fn discipline(&self, worker_id: &str) -> DisciplineStatus;

    /// All pending requests, ordered by id.
    fn pending_requests(&self) -> Vec<ExceptionRequest>;

    /// All archived requests, ordered by id.
    fn archived_requests(&self) -> Vec<ExceptionRequest>;

    /// The holiday rate table.
    fn holiday_rates(&self) -> HolidayRateTable;

    /// Approved expense claims of a worker.
    fn approved_expense_claims(&self, worker_id: &str) -> Vec<ExpenseClaim>;

    /// The fixed weekly shift for a worker, month (`YYYY-MM`) and weekday.
    fn fixed_shift(&self, worker_id: &str, month: &str, weekday: Weekday) -> Option<ShiftWindow>;

    /// One-off schedule entries of a worker on `date`.
    fn one_off_entries(&self, worker_id: &str, date: NaiveDate) -> Vec<OneOffEntry>;

    /// The id the next filed request should take.
    fn next_request_id(&self) -> RequestId;

    /// Applies a batch of changes in order.
    fn commit(&mut self, delta: StateDelta) -> EngineResult<()>;
}
