//! Pay calculation engine.
//!
//! This module turns attendance logs, holiday rates, approved expense claims
//! and a worker's rate composition into a [`PaySummary`](crate::models::PaySummary).
//! Each rule lives in its own file and records an audit step: base rate
//! composition, base pay, holiday supplement, expenses, support pay and
//! withholding.

mod base_pay;
mod expenses;
mod holiday_pay;
mod minutes;
mod pay_summary;
mod withholding;

pub use base_pay::{BasePayResult, BaseRateResult, calculate_base_pay, resolve_base_rate};
pub use expenses::{AdditionResult, apply_support_pay, calculate_expense_total};
pub use holiday_pay::{HolidayPayResult, calculate_holiday_pay};
pub use minutes::{format_time_summary, log_minutes, prorate};
pub use pay_summary::{PayInput, calculate_pay_summary, pay_summary_for};
pub use withholding::{WithholdingResult, calculate_withholding};
