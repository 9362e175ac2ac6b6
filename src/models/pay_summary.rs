//! Pay summary models.
//!
//! This module contains the [`PaySummary`] type and its associated structures
//! that capture all outputs from a pay calculation: per-log pay lines, the
//! holiday breakdown, period totals, and an audit trace.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceLog, LogKind, PayPeriod};

/// Pay earned by a single attendance log.
///
/// # Example
///
/// ```
/// use shift_ledger::models::{LogKind, PayLine};
/// use rust_decimal::Decimal;
/// use chrono::NaiveDate;
///
/// let line = PayLine {
///     log_id: None,
///     date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     kind: LogKind::Closed,
///     minutes: 480,
///     base_rate: Decimal::new(10000, 0),
///     base_pay: Decimal::new(80000, 0),
///     holiday_rate: Decimal::new(1000, 0),
///     holiday_pay: Decimal::new(8000, 0),
///     amount: Decimal::new(88000, 0),
/// };
/// assert_eq!(line.amount, line.base_pay + line.holiday_pay);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The log this line was priced from.
    pub log_id: Option<Uuid>,
    /// The date the log is attributed to.
    pub date: NaiveDate,
    /// Whether the log is closed or still open.
    pub kind: LogKind,
    /// Paid minutes (zero when the log has no positive duration).
    pub minutes: i64,
    /// Base hourly rate applied.
    pub base_rate: Decimal,
    /// `floor(minutes * base_rate / 60)`.
    pub base_pay: Decimal,
    /// Supplemental holiday rate on `date`, zero if none.
    pub holiday_rate: Decimal,
    /// `floor(minutes * holiday_rate / 60)`.
    pub holiday_pay: Decimal,
    /// `base_pay + holiday_pay`.
    pub amount: Decimal,
}

/// Holiday supplement earned by one log.
///
/// Entries are per log, so two logs on the same holiday yield two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayPayEntry {
    /// The log the supplement was earned on.
    pub log_id: Option<Uuid>,
    /// The holiday.
    pub date: NaiveDate,
    /// Minutes worked on the log.
    pub minutes: i64,
    /// Supplemental hourly rate.
    pub rate: Decimal,
    /// Supplement amount.
    pub amount: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Pay for one worker over one period. Derived on every query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaySummary {
    /// The worker the summary is for.
    pub worker_id: String,
    /// The period aggregated over.
    pub period: PayPeriod,
    /// The instant used to price the open log.
    pub computed_at: NaiveDateTime,
    /// Every log in the period, including unpaid ones.
    pub logs: Vec<AttendanceLog>,
    /// Pay per paid log.
    pub pay_lines: Vec<PayLine>,
    /// Holiday supplements per log.
    pub holiday_breakdown: Vec<HolidayPayEntry>,
    /// Paid minutes across the period.
    pub total_minutes: i64,
    /// `total_minutes` rendered as `{h}h{m}m`.
    pub time_summary: String,
    /// Sum of base pay.
    pub base_pay: Decimal,
    /// Sum of holiday supplements.
    pub holiday_pay: Decimal,
    /// Sum of approved expense claims in the period.
    pub expense_total: Decimal,
    /// Fixed support pay.
    pub support_pay: Decimal,
    /// `base_pay + holiday_pay + expense_total + support_pay`.
    pub gross_pay: Decimal,
    /// Flat withholding.
    pub tax: Decimal,
    /// `gross_pay - tax`.
    pub net_pay: Decimal,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
