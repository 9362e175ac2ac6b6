//! Pay period model.
//!
//! A [`PayPeriod`] is an inclusive date range. Periods are usually addressed
//! by a `YYYY-MM` period key and cover one calendar month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive date range that pay is aggregated over.
///
/// # Example
///
/// ```
/// use shift_ledger::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::from_key("2025-02").unwrap();
/// assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// The calendar month `year`/`month`, or `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start_date,
            end_date: next_month.pred_opt()?,
        })
    }

    /// Parses a `YYYY-MM` period key.
    pub fn from_key(key: &str) -> EngineResult<Self> {
        let invalid = || EngineError::Validation {
            field: "period".to_string(),
            message: format!("'{}' is not a YYYY-MM period key", key),
        };
        let (year, month) = key.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::month(year, month).ok_or_else(invalid)
    }

    /// The `YYYY-MM` key of the month the period starts in.
    pub fn key(&self) -> String {
        format!(
            "{:04}-{:02}",
            self.start_date.year(),
            self.start_date.month()
        )
    }

    /// Checks if a given date falls within this pay period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_covers_whole_month() {
        let period = PayPeriod::month(2025, 3).unwrap();
        assert_eq!(period.start_date, date(2025, 3, 1));
        assert_eq!(period.end_date, date(2025, 3, 31));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = PayPeriod::month(2025, 12).unwrap();
        assert_eq!(period.end_date, date(2025, 12, 31));
    }

    #[test]
    fn test_leap_february() {
        let period = PayPeriod::from_key("2024-02").unwrap();
        assert_eq!(period.end_date, date(2024, 2, 29));
    }

    #[test]
    fn test_invalid_keys_are_validation_errors() {
        for key in ["2025", "2025-13", "march", "2025-xx"] {
            match PayPeriod::from_key(key) {
                Err(EngineError::Validation { field, .. }) => assert_eq!(field, "period"),
                other => panic!("Expected validation error for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_contains_date_bounds() {
        let period = PayPeriod::month(2025, 3).unwrap();
        assert!(period.contains_date(date(2025, 3, 1)));
        assert!(period.contains_date(date(2025, 3, 31)));
        assert!(!period.contains_date(date(2025, 2, 28)));
        assert!(!period.contains_date(date(2025, 4, 1)));
    }

    #[test]
    fn test_key_round_trips() {
        assert_eq!(PayPeriod::from_key("2025-07").unwrap().key(), "2025-07");
    }
}
