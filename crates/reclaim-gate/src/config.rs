//! Gate configuration: expiry windows, storage keys, boundaries, bypass policy.
//!
//! # Design
//! - Every field has a default matching the deployed console, so an empty
//!   document is a valid configuration.
//! - Validation runs on every parse; an invalid document never reaches the gate.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Default lifetime of a remembered credential, in days.
pub const DEFAULT_REMEMBERED_DAYS: u32 = 30;
/// Default lifetime of a standard credential, in hours.
pub const DEFAULT_STANDARD_HOURS: u32 = 24;

/// Who may view the live site while maintenance mode is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassPolicy {
    /// Any valid credential, or the operator flag, bypasses maintenance.
    #[default]
    AnyCredential,
    /// Only a valid credential that also carries the operator flag bypasses.
    OperatorOnly,
}

/// Persisted storage keys consulted by the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Standard credential record.
    pub standard: String,
    /// Remembered credential record.
    pub remembered: String,
    /// Operator flag written at sign-in.
    pub operator: String,
    /// Maintenance on/off flag.
    pub maintenance_mode: String,
    /// Maintenance end date (descriptive only).
    pub maintenance_end_date: String,
    /// Maintenance message (descriptive only).
    pub maintenance_message: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            standard: "adminAuth".to_string(),
            remembered: "adminAuthRemembered".to_string(),
            operator: "adminOperator".to_string(),
            maintenance_mode: "maintenanceMode".to_string(),
            maintenance_end_date: "maintenanceEndDate".to_string(),
            maintenance_message: "maintenanceMessage".to_string(),
        }
    }
}

impl StorageKeys {
    fn all(&self) -> [(&'static str, &str); 6] {
        [
            ("keys.standard", &self.standard),
            ("keys.remembered", &self.remembered),
            ("keys.operator", &self.operator),
            ("keys.maintenance_mode", &self.maintenance_mode),
            ("keys.maintenance_end_date", &self.maintenance_end_date),
            ("keys.maintenance_message", &self.maintenance_message),
        ]
    }
}

/// Access gate configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Lifetime of a remembered credential, in days.
    pub remembered_days: u32,
    /// Lifetime of a standard credential, in hours.
    pub standard_hours: u32,
    /// Route of the login boundary.
    pub login_path: String,
    /// Route of the maintenance boundary.
    pub maintenance_path: String,
    /// Storage keys.
    pub keys: StorageKeys,
    /// Maintenance bypass rule.
    pub maintenance_bypass: BypassPolicy,
    /// Accounts flagged as operators when they sign in.
    pub operator_emails: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            remembered_days: DEFAULT_REMEMBERED_DAYS,
            standard_hours: DEFAULT_STANDARD_HOURS,
            login_path: "/login".to_string(),
            maintenance_path: "/maintenance".to_string(),
            keys: StorageKeys::default(),
            maintenance_bypass: BypassPolicy::default(),
            operator_emails: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::ConfigParse`] for malformed JSON and
    /// [`GateError::InvalidConfig`] when validation fails.
    pub fn from_json(raw: &str) -> GateResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| GateError::ConfigParse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> GateResult<()> {
        if self.remembered_days == 0 {
            return Err(invalid("remembered_days", "must be positive"));
        }
        if self.standard_hours == 0 {
            return Err(invalid("standard_hours", "must be positive"));
        }
        if self.standard_window() > self.remembered_window() {
            return Err(invalid(
                "standard_hours",
                "must not exceed the remembered window",
            ));
        }
        if !self.login_path.starts_with('/') {
            return Err(invalid("login_path", "must start with '/'"));
        }
        if !self.maintenance_path.starts_with('/') {
            return Err(invalid("maintenance_path", "must start with '/'"));
        }
        if self.login_path == self.maintenance_path {
            return Err(invalid("maintenance_path", "must differ from login_path"));
        }

        let mut seen = BTreeSet::new();
        for (field, key) in self.keys.all() {
            if key.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if !seen.insert(key) {
                return Err(invalid(field, "must be unique"));
            }
        }
        Ok(())
    }

    /// Lifetime of a remembered credential.
    #[must_use]
    pub fn remembered_window(&self) -> Duration {
        Duration::days(i64::from(self.remembered_days))
    }

    /// Lifetime of a standard credential.
    #[must_use]
    pub fn standard_window(&self) -> Duration {
        Duration::hours(i64::from(self.standard_hours))
    }

    /// Whether `email` belongs to a configured operator account.
    #[must_use]
    pub fn is_operator_email(&self, email: &str) -> bool {
        let email = email.trim();
        self.operator_emails
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(email))
    }
}

const fn invalid(field: &'static str, reason: &'static str) -> GateError {
    GateError::InvalidConfig { field, reason }
}
