//! Base hourly rate resolution and base pay aggregation.

use rust_decimal::Decimal;

use crate::models::{AuditStep, HourlyRateComposition, PayLine};

/// The resolved base rate, including the audit step.
#[derive(Debug, Clone)]
pub struct BaseRateResult {
    /// Hourly rate applied to every paid minute.
    pub rate: Decimal,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Sums the hourly rate composition. Absent components count as zero.
///
/// # Examples
///
/// ```
/// use shift_ledger::calculation::resolve_base_rate;
/// use shift_ledger::models::HourlyRateComposition;
/// use rust_decimal::Decimal;
///
/// let composition = HourlyRateComposition {
///     base: Some(Decimal::new(10000, 0)),
///     position_allowance: None,
///     skill_allowance: Some(Decimal::new(300, 0)),
/// };
/// let result = resolve_base_rate(&composition, 1);
/// assert_eq!(result.rate, Decimal::new(10300, 0));
/// ```
pub fn resolve_base_rate(composition: &HourlyRateComposition, step_number: u32) -> BaseRateResult {
    let rate = composition.total();
    let show = |v: Option<Decimal>| v.map(|d| d.to_string());

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_rate".to_string(),
        rule_name: "Base Rate Composition".to_string(),
        input: serde_json::json!({
            "base": show(composition.base),
            "position_allowance": show(composition.position_allowance),
            "skill_allowance": show(composition.skill_allowance),
        }),
        output: serde_json::json!({ "rate": rate.to_string() }),
        reasoning: format!("Summed present rate components (missing ones as 0) = {}", rate),
    };

    BaseRateResult { rate, audit_step }
}

/// Base pay summed over the period, including the audit step.
#[derive(Debug, Clone)]
pub struct BasePayResult {
    /// Total base pay.
    pub total: Decimal,
    /// Total paid minutes.
    pub total_minutes: i64,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sums base pay over priced lines.
pub fn calculate_base_pay(lines: &[PayLine], rate: Decimal, step_number: u32) -> BasePayResult {
    let total: Decimal = lines.iter().map(|l| l.base_pay).sum();
    let total_minutes: i64 = lines.iter().map(|l| l.minutes).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_pay".to_string(),
        rule_name: "Base Pay".to_string(),
        input: serde_json::json!({
            "rate": rate.to_string(),
            "lines": lines.len(),
            "total_minutes": total_minutes,
        }),
        output: serde_json::json!({ "base_pay": total.to_string() }),
        reasoning: format!(
            "Sum of floor(minutes x {} / 60) over {} log(s) = {}",
            rate,
            lines.len(),
            total
        ),
    };

    BasePayResult {
        total,
        total_minutes,
        audit_step,
    }
}
