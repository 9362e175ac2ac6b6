//! Flat-rate tax withholding.

use rust_decimal::Decimal;

use crate::models::AuditStep;

/// Tax and net pay, including the audit step.
#[derive(Debug, Clone)]
pub struct WithholdingResult {
    /// `floor(gross * rate)`.
    pub tax: Decimal,
    /// `gross - tax`.
    pub net_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Withholds a flat share of gross pay. The rate is not graduated.
///
/// # Examples
///
/// ```
/// use shift_ledger::calculation::calculate_withholding;
/// use rust_decimal::Decimal;
///
/// let result = calculate_withholding(Decimal::new(88000, 0), Decimal::new(33, 3), 1);
/// assert_eq!(result.tax, Decimal::new(2904, 0));
/// assert_eq!(result.net_pay, Decimal::new(85096, 0));
/// ```
pub fn calculate_withholding(gross: Decimal, rate: Decimal, step_number: u32) -> WithholdingResult {
    let tax = (gross * rate).floor();
    let net_pay = gross - tax;

    let audit_step = AuditStep {
        step_number,
        rule_id: "withholding".to_string(),
        rule_name: "Tax Withholding".to_string(),
        input: serde_json::json!({
            "gross_pay": gross.to_string(),
            "rate": rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "tax": tax.to_string(),
            "net_pay": net_pay.to_string(),
        }),
        reasoning: format!(
            "floor({} x {}) = {}; net {} - {} = {}",
            gross,
            rate.normalize(),
            tax,
            gross,
            tax,
            net_pay
        ),
    };

    WithholdingResult {
        tax,
        net_pay,
        audit_step,
    }
}
