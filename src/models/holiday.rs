//! Holiday rate table and expense claim models.
//!
//! Both are maintained outside the attendance flow and consumed by the pay
//! engine: a holiday rate adds a supplemental hourly rate on its date, an
//! approved expense claim adds a flat amount to the period it falls in.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RequestId;

/// Supplemental hourly rate per date.
///
/// # Example
///
/// ```
/// use shift_ledger::models::HolidayRateTable;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut table = HolidayRateTable::default();
/// let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// table.set(new_year, Decimal::new(1000, 0));
///
/// assert_eq!(table.rate_on(new_year), Decimal::new(1000, 0));
/// assert_eq!(table.rate_on(new_year.succ_opt().unwrap()), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayRateTable {
    rates: BTreeMap<NaiveDate, Decimal>,
}

/// Aggregate outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows that created a new entry.
    pub added: u32,
    /// Rows that replaced an existing entry.
    pub updated: u32,
    /// Rows that could not be parsed.
    pub skipped: u32,
}

impl HolidayRateTable {
    /// Sets the supplemental rate for `date`, returning the previous one.
    pub fn set(&mut self, date: NaiveDate, rate: Decimal) -> Option<Decimal> {
        self.rates.insert(date, rate)
    }

    /// The supplemental rate on `date`, zero when none is set.
    pub fn rate_on(&self, date: NaiveDate) -> Decimal {
        self.rates.get(&date).copied().unwrap_or(Decimal::ZERO)
    }

    /// True when `date` carries a positive supplemental rate.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.rate_on(date) > Decimal::ZERO
    }

    /// Number of dates in the table.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True when the table has no dates.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Imports `(YYYY-MM-DD, rate)` text rows.
    ///
    /// Malformed rows and negative rates are skipped and counted; they never
    /// abort the batch.
    pub fn import_rows<S: AsRef<str>>(&mut self, rows: &[(S, S)]) -> ImportReport {
        let mut report = ImportReport::default();
        for (date, rate) in rows {
            let parsed = NaiveDate::parse_from_str(date.as_ref().trim(), "%Y-%m-%d")
                .ok()
                .zip(Decimal::from_str(rate.as_ref().trim()).ok());
            match parsed {
                Some((date, rate)) if rate >= Decimal::ZERO => {
                    if self.set(date, rate).is_some() {
                        report.updated += 1;
                    } else {
                        report.added += 1;
                    }
                }
                _ => report.skipped += 1,
            }
        }
        report
    }
}

/// An approved reimbursement visible to payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseClaim {
    /// The request the claim was approved from.
    #[serde(default)]
    pub request_id: Option<RequestId>,
    /// The claiming worker.
    pub worker_id: String,
    /// The day the expense was incurred.
    pub date: NaiveDate,
    /// Amount to reimburse.
    pub amount: Decimal,
    /// Expense category.
    pub category: String,
}
