//! Holiday supplement aggregation.
//!
//! The supplement is additive: a worker earns the base rate plus the full
//! holiday rate for every minute on a holiday.

use rust_decimal::Decimal;

use crate::models::{AuditStep, HolidayPayEntry, PayLine};

/// Holiday pay summed over the period, including the audit step.
#[derive(Debug, Clone)]
pub struct HolidayPayResult {
    /// Total holiday supplement.
    pub total: Decimal,
    /// One entry per log that earned a supplement.
    pub breakdown: Vec<HolidayPayEntry>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Collects holiday supplements from priced lines.
///
/// Entries are reported per log, not per day. Lines without a positive
/// holiday rate or positive minutes are left out.
pub fn calculate_holiday_pay(lines: &[PayLine], step_number: u32) -> HolidayPayResult {
    let breakdown: Vec<HolidayPayEntry> = lines
        .iter()
        .filter(|l| l.minutes > 0 && l.holiday_rate > Decimal::ZERO)
        .map(|l| HolidayPayEntry {
            log_id: l.log_id,
            date: l.date,
            minutes: l.minutes,
            rate: l.holiday_rate,
            amount: l.holiday_pay,
        })
        .collect();
    let total: Decimal = breakdown.iter().map(|e| e.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "holiday_pay".to_string(),
        rule_name: "Holiday Supplement".to_string(),
        input: serde_json::json!({
            "holiday_logs": breakdown
                .iter()
                .map(|e| serde_json::json!({
                    "date": e.date.to_string(),
                    "minutes": e.minutes,
                    "rate": e.rate.to_string(),
                }))
                .collect::<Vec<_>>(),
        }),
        output: serde_json::json!({ "holiday_pay": total.to_string() }),
        reasoning: if breakdown.is_empty() {
            "No minutes worked on holidays".to_string()
        } else {
            format!(
                "Sum of floor(minutes x holiday rate / 60) over {} log(s) = {}",
                breakdown.len(),
                total
            )
        },
    };

    HolidayPayResult {
        total,
        breakdown,
        audit_step,
    }
}
