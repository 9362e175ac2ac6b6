//! Core data models for the shift ledger.
//!
//! This module contains all the domain models used throughout the crate.

mod attendance;
mod holiday;
mod pay_period;
mod pay_summary;
mod request;
mod schedule;
mod worker;

pub use attendance::{
    AttendanceLog, DisciplineStatus, LogKind, WorkingSession, format_duration, hhmm,
    minutes_between, parse_clock_time, parse_duration,
};
pub use holiday::{ExpenseClaim, HolidayRateTable, ImportReport};
pub use pay_period::PayPeriod;
pub use pay_summary::{AuditStep, AuditTrace, AuditWarning, HolidayPayEntry, PayLine, PaySummary};
pub use request::{ExceptionRequest, RequestId, RequestKind, RequestPayload, RequestStatus};
pub use schedule::{FixedShiftEntry, OneOffEntry, OneOffKind, ShiftWindow, month_key};
pub use worker::{HourlyRateComposition, Worker};
