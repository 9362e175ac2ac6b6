//! Approved expense claims and support pay.

use rust_decimal::Decimal;

use crate::models::{AuditStep, ExpenseClaim, PayPeriod};

/// An amount added to gross pay, including the audit step.
#[derive(Debug, Clone)]
pub struct AdditionResult {
    /// The amount added.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sums approved claims dated inside the period.
pub fn calculate_expense_total(
    claims: &[ExpenseClaim],
    period: &PayPeriod,
    step_number: u32,
) -> AdditionResult {
    let in_period: Vec<&ExpenseClaim> = claims
        .iter()
        .filter(|c| period.contains_date(c.date))
        .collect();
    let total: Decimal = in_period.iter().map(|c| c.amount).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "expenses".to_string(),
        rule_name: "Approved Expenses".to_string(),
        input: serde_json::json!({
            "claims": in_period
                .iter()
                .map(|c| serde_json::json!({
                    "date": c.date.to_string(),
                    "category": c.category,
                    "amount": c.amount.to_string(),
                }))
                .collect::<Vec<_>>(),
            "skipped_outside_period": claims.len() - in_period.len(),
        }),
        output: serde_json::json!({ "expense_total": total.to_string() }),
        reasoning: format!("{} approved claim(s) in period = {}", in_period.len(), total),
    };

    AdditionResult { total, audit_step }
}

/// Records the worker's fixed support pay.
pub fn apply_support_pay(support_pay: Decimal, step_number: u32) -> AdditionResult {
    AdditionResult {
        total: support_pay,
        audit_step: AuditStep {
            step_number,
            rule_id: "support_pay".to_string(),
            rule_name: "Support Pay".to_string(),
            input: serde_json::json!({ "support_pay": support_pay.to_string() }),
            output: serde_json::json!({ "support_pay": support_pay.to_string() }),
            reasoning: format!("Fixed support pay of {} added to gross", support_pay),
        },
    }
}
