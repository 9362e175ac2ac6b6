//! Period pay aggregation.
//!
//! [`calculate_pay_summary`] is a pure function of a [`PayInput`]; calling it
//! twice with the same input yields the same [`PaySummary`].
//! [`pay_summary_for`] gathers that input from a repository.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceLog, AuditTrace, AuditWarning, ExpenseClaim, HolidayRateTable,
    HourlyRateComposition, LogKind, PayLine, PayPeriod, PaySummary, WorkingSession,
};
use crate::store::Repository;

use super::base_pay::{calculate_base_pay, resolve_base_rate};
use super::expenses::{apply_support_pay, calculate_expense_total};
use super::holiday_pay::calculate_holiday_pay;
use super::minutes::{format_time_summary, log_minutes, prorate};
use super::withholding::calculate_withholding;

/// Everything the pay engine reads for one worker and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayInput {
    /// The worker being paid.
    pub worker_id: String,
    /// The period to aggregate over.
    pub period: PayPeriod,
    /// The instant an open log is priced up to.
    pub now: NaiveDateTime,
    /// The worker's stored logs (any period).
    pub logs: Vec<AttendanceLog>,
    /// The worker's open session, if any.
    pub open_session: Option<WorkingSession>,
    /// The liveness flag; an open session is only paid while it is set.
    pub marked_working: bool,
    /// Supplemental holiday rates.
    pub holiday_rates: HolidayRateTable,
    /// The worker's approved expense claims (any period).
    pub expense_claims: Vec<ExpenseClaim>,
    /// Hourly rate components.
    pub hourly_rate: HourlyRateComposition,
    /// Fixed support pay.
    pub support_pay: Decimal,
    /// Flat withholding rate.
    pub withholding_rate: Decimal,
}

/// Prices one log at the base and holiday rates.
fn price_log(
    log: &AttendanceLog,
    minutes: i64,
    base_rate: Decimal,
    holidays: &HolidayRateTable,
) -> PayLine {
    let holiday_rate = holidays.rate_on(log.date);
    let base_pay = prorate(minutes, base_rate);
    let holiday_pay = if holiday_rate > Decimal::ZERO {
        prorate(minutes, holiday_rate)
    } else {
        Decimal::ZERO
    };

    PayLine {
        log_id: log.id,
        date: log.date,
        kind: log.kind,
        minutes,
        base_rate,
        base_pay,
        holiday_rate,
        holiday_pay,
        amount: base_pay + holiday_pay,
    }
}

/// Computes pay for one worker over one period.
///
/// Logs are included when their date falls inside the period. Logs with no
/// positive minutes stay in [`PaySummary::logs`] but earn nothing. The open
/// session is priced only while the worker is marked as working.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
/// use shift_ledger::calculation::{PayInput, calculate_pay_summary};
/// use shift_ledger::models::{
///     AttendanceLog, HolidayRateTable, HourlyRateComposition, LogKind, PayPeriod,
/// };
///
/// let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let mut holidays = HolidayRateTable::default();
/// holidays.set(new_year, Decimal::new(1000, 0));
///
/// let input = PayInput {
///     worker_id: "w_001".to_string(),
///     period: PayPeriod::from_key("2025-01").unwrap(),
///     now: new_year.and_hms_opt(23, 0, 0).unwrap(),
///     logs: vec![AttendanceLog {
///         id: None,
///         worker_id: "w_001".to_string(),
///         branch_id: "main".to_string(),
///         kind: LogKind::Closed,
///         date: new_year,
///         start_time: NaiveTime::from_hms_opt(9, 0, 0),
///         end_time: NaiveTime::from_hms_opt(17, 0, 0),
///         duration_minutes: 480,
///         is_late: false,
///         is_no_show_late: false,
///         is_unscheduled: false,
///         is_sub: false,
///     }],
///     open_session: None,
///     marked_working: false,
///     holiday_rates: holidays,
///     expense_claims: vec![],
///     hourly_rate: HourlyRateComposition {
///         base: Some(Decimal::new(10000, 0)),
///         position_allowance: None,
///         skill_allowance: None,
///     },
///     support_pay: Decimal::ZERO,
///     withholding_rate: Decimal::new(33, 3),
/// };
///
/// let summary = calculate_pay_summary(&input);
/// assert_eq!(summary.base_pay, Decimal::new(80000, 0));
/// assert_eq!(summary.holiday_pay, Decimal::new(8000, 0));
/// assert_eq!(summary.gross_pay, Decimal::new(88000, 0));
/// assert_eq!(summary.time_summary, "8h0m");
/// ```
pub fn calculate_pay_summary(input: &PayInput) -> PaySummary {
    let mut trace = AuditTrace::default();
    let mut step = 0u32;
    let mut next_step = || {
        step += 1;
        step
    };

    let mut logs: Vec<AttendanceLog> = input
        .logs
        .iter()
        .filter(|log| input.period.contains_date(log.date))
        .cloned()
        .collect();

    if let Some(session) = &input.open_session {
        let open = session.to_open_log();
        if !input.period.contains_date(open.date) {
            debug!(worker_id = %input.worker_id, "Open session outside period");
        } else if input.marked_working {
            logs.push(open);
        } else {
            trace.warnings.push(AuditWarning {
                code: "STALE_SESSION".to_string(),
                message: format!(
                    "Open session started {} excluded: worker is not marked as working",
                    session.started_at
                ),
            });
        }
    }

    let base_rate = resolve_base_rate(&input.hourly_rate, next_step());
    trace.steps.push(base_rate.audit_step);
    let rate = base_rate.rate;

    let pay_lines: Vec<PayLine> = logs
        .iter()
        .filter(|log| log.kind != LogKind::Open || input.marked_working)
        .filter_map(|log| {
            let minutes = log_minutes(log, input.now);
            (minutes > 0).then(|| price_log(log, minutes, rate, &input.holiday_rates))
        })
        .collect();

    for log in logs.iter().filter(|l| l.kind == LogKind::Closed && l.duration_minutes < 0) {
        trace.warnings.push(AuditWarning {
            code: "NEGATIVE_DURATION".to_string(),
            message: format!("Log on {} has a negative duration and earns nothing", log.date),
        });
    }

    let base = calculate_base_pay(&pay_lines, rate, next_step());
    trace.steps.push(base.audit_step);

    let holiday = calculate_holiday_pay(&pay_lines, next_step());
    trace.steps.push(holiday.audit_step);

    let expenses = calculate_expense_total(&input.expense_claims, &input.period, next_step());
    trace.steps.push(expenses.audit_step);

    let support = apply_support_pay(input.support_pay, next_step());
    trace.steps.push(support.audit_step);

    let gross_pay = base.total + holiday.total + expenses.total + support.total;
    let withholding = calculate_withholding(gross_pay, input.withholding_rate, next_step());
    trace.steps.push(withholding.audit_step);

    PaySummary {
        worker_id: input.worker_id.clone(),
        period: input.period.clone(),
        computed_at: input.now,
        logs,
        pay_lines,
        holiday_breakdown: holiday.breakdown,
        total_minutes: base.total_minutes,
        time_summary: format_time_summary(base.total_minutes),
        base_pay: base.total,
        holiday_pay: holiday.total,
        expense_total: expenses.total,
        support_pay: support.total,
        gross_pay,
        tax: withholding.tax,
        net_pay: withholding.net_pay,
        audit_trace: trace,
    }
}

/// Reads a worker's records and computes their pay for `period`.
pub fn pay_summary_for<R: Repository + ?Sized>(
    repo: &R,
    policy: &PolicyConfig,
    worker_id: &str,
    period: PayPeriod,
    now: NaiveDateTime,
) -> EngineResult<PaySummary> {
    let worker = repo
        .worker(worker_id)
        .ok_or_else(|| EngineError::WorkerNotFound {
            worker_id: worker_id.to_string(),
        })?;

    let input = PayInput {
        worker_id: worker.id.clone(),
        period,
        now,
        logs: repo.attendance_logs(worker_id),
        open_session: repo.working_session(worker_id),
        marked_working: repo.is_marked_working(worker_id),
        holiday_rates: repo.holiday_rates(),
        expense_claims: repo.approved_expense_claims(worker_id),
        support_pay: worker.support_pay(),
        hourly_rate: worker.hourly_rate,
        withholding_rate: policy.withholding_rate,
    };

    let summary = calculate_pay_summary(&input);
    info!(
        worker_id = %worker_id,
        period = %summary.period.key(),
        gross_pay = %summary.gross_pay,
        net_pay = %summary.net_pay,
        "Pay summary computed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn closed(date: NaiveDate, minutes: i64) -> AttendanceLog {
        AttendanceLog {
            id: Some(uuid::Uuid::new_v4()),
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            kind: LogKind::Closed,
            date,
            start_time: Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
            end_time: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
            duration_minutes: minutes,
            is_late: false,
            is_no_show_late: false,
            is_unscheduled: false,
            is_sub: false,
        }
    }

    fn input(logs: Vec<AttendanceLog>) -> PayInput {
        PayInput {
            worker_id: "w_001".to_string(),
            period: PayPeriod::from_key("2025-01").unwrap(),
            now: date(1, 31).and_hms_opt(12, 0, 0).unwrap(),
            logs,
            open_session: None,
            marked_working: false,
            holiday_rates: HolidayRateTable::default(),
            expense_claims: Vec::new(),
            hourly_rate: HourlyRateComposition {
                base: Some(dec("10000")),
                position_allowance: None,
                skill_allowance: None,
            },
            support_pay: Decimal::ZERO,
            withholding_rate: dec("0.033"),
        }
    }

    fn session(started_at: NaiveDateTime) -> WorkingSession {
        WorkingSession {
            worker_id: "w_001".to_string(),
            branch_id: "main".to_string(),
            started_at,
            is_late: false,
            is_unscheduled: false,
            is_sub: false,
        }
    }

    #[test]
    fn test_holiday_is_additive_to_base() {
        let mut input = input(vec![closed(date(1, 1), 480)]);
        input.holiday_rates.set(date(1, 1), dec("1000"));

        let summary = calculate_pay_summary(&input);
        assert_eq!(summary.pay_lines[0].base_pay, dec("80000"));
        assert_eq!(summary.pay_lines[0].holiday_pay, dec("8000"));
        assert_eq!(summary.pay_lines[0].amount, dec("88000"));
        assert_eq!(summary.holiday_breakdown.len(), 1);
    }

    #[test]
    fn test_gross_tax_and_net() {
        let mut input = input(vec![closed(date(1, 6), 480), closed(date(1, 7), 450)]);
        input.support_pay = dec("20000");
        input.expense_claims.push(ExpenseClaim {
            request_id: Some(3),
            worker_id: "w_001".to_string(),
            date: date(1, 10),
            amount: dec("4500"),
            category: "transport".to_string(),
        });

        let summary = calculate_pay_summary(&input);
        // 80000 + 75000 + 4500 + 20000
        assert_eq!(summary.gross_pay, dec("179500"));
        // floor(179500 * 0.033) = floor(5923.5)
        assert_eq!(summary.tax, dec("5923"));
        assert_eq!(summary.net_pay, dec("173577"));
        assert_eq!(summary.time_summary, "15h30m");
        assert_eq!(summary.audit_trace.steps.len(), 6);
    }

    #[test]
    fn test_logs_outside_period_are_ignored() {
        let summary = calculate_pay_summary(&input(vec![closed(date(2, 1), 480)]));
        assert!(summary.logs.is_empty());
        assert_eq!(summary.gross_pay, Decimal::ZERO);
    }

    #[test]
    fn test_zero_minute_log_listed_but_unpaid() {
        let mut input = input(vec![closed(date(1, 1), 0)]);
        input.holiday_rates.set(date(1, 1), dec("1000"));

        let summary = calculate_pay_summary(&input);
        assert_eq!(summary.logs.len(), 1);
        assert!(summary.pay_lines.is_empty());
        assert!(summary.holiday_breakdown.is_empty());
        assert_eq!(summary.total_minutes, 0);
    }

    #[test]
    fn test_negative_duration_warns() {
        let summary = calculate_pay_summary(&input(vec![closed(date(1, 3), -20)]));
        assert_eq!(summary.gross_pay, Decimal::ZERO);
        assert_eq!(summary.audit_trace.warnings[0].code, "NEGATIVE_DURATION");
    }

    #[test]
    fn test_open_session_paid_only_when_marked() {
        let mut input = input(vec![]);
        input.open_session = Some(session(date(1, 31).and_hms_opt(9, 0, 0).unwrap()));

        let stale = calculate_pay_summary(&input);
        assert_eq!(stale.total_minutes, 0);
        assert!(stale.logs.is_empty());
        assert_eq!(stale.audit_trace.warnings[0].code, "STALE_SESSION");

        input.marked_working = true;
        let live = calculate_pay_summary(&input);
        // 09:00 to 12:00
        assert_eq!(live.total_minutes, 180);
        assert_eq!(live.base_pay, dec("30000"));
        assert_eq!(live.pay_lines[0].kind, LogKind::Open);
    }

    #[test]
    fn test_missing_rate_components_are_zero() {
        let mut input = input(vec![closed(date(1, 6), 480)]);
        input.hourly_rate = HourlyRateComposition::default();

        let summary = calculate_pay_summary(&input);
        assert_eq!(summary.base_pay, Decimal::ZERO);
        assert_eq!(summary.total_minutes, 480);
    }

    #[test]
    fn test_idempotent() {
        let mut input = input(vec![closed(date(1, 1), 480), closed(date(1, 2), 17)]);
        input.holiday_rates.set(date(1, 1), dec("1000"));
        let before = input.clone();

        let first = calculate_pay_summary(&input);
        let second = calculate_pay_summary(&input);
        assert_eq!(first, second);
        assert_eq!(input, before);
    }

    #[test]
    fn test_pay_summary_for_unknown_worker() {
        let store = crate::store::InMemoryStore::new();
        let result = pay_summary_for(
            &store,
            &PolicyConfig::default(),
            "ghost",
            PayPeriod::from_key("2025-01").unwrap(),
            date(1, 31).and_hms_opt(12, 0, 0).unwrap(),
        );
        assert!(matches!(result, Err(EngineError::WorkerNotFound { .. })));
    }
}
