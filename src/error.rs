//! Error types for the shift ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Only genuine failures live here: the ordinary branches of the attendance
//! state machine (no schedule, too early, too late, locked) are reported as
//! [`ClockInOutcome`](crate::attendance::ClockInOutcome) values instead.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the shift ledger.
///
/// # Example
///
/// ```
/// use shift_ledger::error::EngineError;
///
/// let error = EngineError::Suspended {
///     worker_id: "w_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Worker 'w_001' is suspended and cannot clock in");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Clock-in was blocked because the worker's discipline status is suspended.
    #[error("Worker '{worker_id}' is suspended and cannot clock in")]
    Suspended {
        /// The suspended worker.
        worker_id: String,
    },

    /// A submission was missing a required field or carried an invalid value.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No worker with the given id exists in the store.
    #[error("Worker not found: {worker_id}")]
    WorkerNotFound {
        /// The id that was looked up.
        worker_id: String,
    },

    /// No pending or archived request with the given id exists.
    #[error("Exception request not found: {request_id}")]
    RequestNotFound {
        /// The id that was looked up.
        request_id: u64,
    },

    /// The attendance log targeted by a time correction could not be matched.
    #[error("No attendance log for worker '{worker_id}' on {date}")]
    LogNotFound {
        /// The worker the correction belongs to.
        worker_id: String,
        /// The date the correction targets.
        date: NaiveDate,
    },

    /// A wall-clock value could not be parsed as `HH:MM`.
    #[error("Invalid time value: '{value}'")]
    InvalidTime {
        /// The text that failed to parse.
        value: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
