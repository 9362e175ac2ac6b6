//! Configuration types for attendance and payroll policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `policy.yaml`.

use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attendance and payroll policy.
///
/// Every field has a default, so an empty YAML document is a valid policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Clocking in earlier than `start - early_grace_minutes` files an
    /// unscheduled-work request instead.
    pub early_grace_minutes: i64,
    /// Clocking in later than `start + late_grace_minutes` records an absence.
    pub late_grace_minutes: i64,
    /// Clocking in at or after `start + late_after_minutes` is late.
    pub late_after_minutes: i64,
    /// Absences that suspend a worker.
    pub discipline_threshold: u32,
    /// Flat withholding rate applied to gross pay.
    pub withholding_rate: Decimal,
    /// How long resolved requests stay in the archive view.
    pub archive_retention_days: i64,
    /// Administrator polling interval.
    pub refresh_interval_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            early_grace_minutes: 15,
            late_grace_minutes: 15,
            late_after_minutes: 1,
            discipline_threshold: 2,
            withholding_rate: Decimal::new(33, 3),
            archive_retention_days: 20,
            refresh_interval_secs: 5,
        }
    }
}

impl PolicyConfig {
    /// The early grace window as a duration.
    pub fn early_grace(&self) -> Duration {
        Duration::minutes(self.early_grace_minutes)
    }

    /// The late grace window as a duration.
    pub fn late_grace(&self) -> Duration {
        Duration::minutes(self.late_grace_minutes)
    }

    /// The offset from scheduled start at which a clock-in counts as late.
    pub fn late_after(&self) -> Duration {
        Duration::minutes(self.late_after_minutes)
    }

    /// The archive retention window as a duration.
    pub fn archive_retention(&self) -> Duration {
        Duration::days(self.archive_retention_days)
    }

    /// Returns a copy with the override's fields applied.
    pub fn with_override(&self, over: &PolicyOverride) -> Self {
        Self {
            early_grace_minutes: over.early_grace_minutes.unwrap_or(self.early_grace_minutes),
            late_grace_minutes: over.late_grace_minutes.unwrap_or(self.late_grace_minutes),
            late_after_minutes: over.late_after_minutes.unwrap_or(self.late_after_minutes),
            discipline_threshold: over
                .discipline_threshold
                .unwrap_or(self.discipline_threshold),
            ..self.clone()
        }
    }
}

/// Branch-level policy adjustments. Payroll settings are not overridable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverride {
    /// Overrides [`PolicyConfig::early_grace_minutes`].
    pub early_grace_minutes: Option<i64>,
    /// Overrides [`PolicyConfig::late_grace_minutes`].
    pub late_grace_minutes: Option<i64>,
    /// Overrides [`PolicyConfig::late_after_minutes`].
    pub late_after_minutes: Option<i64>,
    /// Overrides [`PolicyConfig::discipline_threshold`].
    pub discipline_threshold: Option<u32>,
}

/// Layout of `policy.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    /// Policy applied to every branch.
    pub defaults: PolicyConfig,
    /// Per-branch adjustments keyed by branch id.
    pub branches: HashMap<String, PolicyOverride>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_house_rules() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.early_grace(), Duration::minutes(15));
        assert_eq!(policy.late_grace(), Duration::minutes(15));
        assert_eq!(policy.late_after(), Duration::minutes(1));
        assert_eq!(policy.discipline_threshold, 2);
        assert_eq!(policy.withholding_rate, Decimal::new(33, 3));
        assert_eq!(policy.archive_retention(), Duration::days(20));
    }

    #[test]
    fn test_empty_yaml_is_default_policy() {
        let file: PolicyFile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(file.defaults, PolicyConfig::default());
        assert!(file.branches.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
defaults:
  late_grace_minutes: 10
  withholding_rate: "0.05"
"#;
        let file: PolicyFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.defaults.late_grace_minutes, 10);
        assert_eq!(file.defaults.early_grace_minutes, 15);
        assert_eq!(file.defaults.withholding_rate, Decimal::new(5, 2));
    }

    #[test]
    fn test_override_only_touches_given_fields() {
        let base = PolicyConfig::default();
        let over = PolicyOverride {
            discipline_threshold: Some(3),
            ..PolicyOverride::default()
        };

        let merged = base.with_override(&over);
        assert_eq!(merged.discipline_threshold, 3);
        assert_eq!(merged.late_grace_minutes, 15);
        assert_eq!(merged.withholding_rate, base.withholding_rate);
    }
}
