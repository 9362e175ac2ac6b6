//! Shift ledger: attendance state machine and payroll engine
//!
//! This crate tracks shift workers' clock-in/clock-out lifecycle (schedule
//! conformance, no-show locks, discipline escalation, exception requests) and
//! turns the resulting attendance logs into per-period pay summaries with
//! holiday supplements, expenses and withholding.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod store;
