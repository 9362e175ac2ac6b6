//! Worker model and hourly rate composition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The components that add up to a worker's hourly rate.
///
/// Every component is optional; a missing component counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyRateComposition {
    /// The base wage per hour.
    #[serde(default)]
    pub base: Option<Decimal>,
    /// Per-hour allowance attached to the worker's position.
    #[serde(default)]
    pub position_allowance: Option<Decimal>,
    /// Per-hour allowance for certified skills.
    #[serde(default)]
    pub skill_allowance: Option<Decimal>,
}

impl HourlyRateComposition {
    /// Sums the components, treating absent ones as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_ledger::models::HourlyRateComposition;
    /// use rust_decimal::Decimal;
    ///
    /// let rate = HourlyRateComposition {
    ///     base: Some(Decimal::new(9860, 0)),
    ///     position_allowance: Some(Decimal::new(500, 0)),
    ///     skill_allowance: None,
    /// };
    /// assert_eq!(rate.total(), Decimal::new(10360, 0));
    /// ```
    pub fn total(&self) -> Decimal {
        [self.base, self.position_allowance, self.skill_allowance]
            .into_iter()
            .flatten()
            .sum()
    }
}

/// A crew member who clocks in and gets paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier for the worker.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The branch the worker belongs to.
    pub branch_id: String,
    /// Hourly rate components.
    #[serde(default)]
    pub hourly_rate: HourlyRateComposition,
    /// Fixed support amount added once per pay period.
    #[serde(default)]
    pub support_pay: Option<Decimal>,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Payroll bank account.
    #[serde(default)]
    pub bank_account: Option<String>,
}

impl Worker {
    /// The hourly rate the pay engine uses as the base rate.
    pub fn base_hourly_rate(&self) -> Decimal {
        self.hourly_rate.total()
    }

    /// Support pay, zero when not set.
    pub fn support_pay(&self) -> Decimal {
        self.support_pay.unwrap_or(Decimal::ZERO)
    }

    /// Applies one profile field change. Returns false for unknown fields.
    pub fn apply_profile_change(&mut self, field: &str, value: &str) -> bool {
        match field {
            "name" => self.name = value.to_string(),
            "phone" => self.phone = Some(value.to_string()),
            "bank_account" => self.bank_account = Some(value.to_string()),
            _ => return false,
        }
        true
    }
}
