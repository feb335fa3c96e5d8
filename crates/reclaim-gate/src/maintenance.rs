//! Site-wide maintenance override.
//!
//! # Design
//! - Only `enabled` is enforced; end date and message are descriptive.
//! - The session check runs only when maintenance is enabled.
//! - Fail closed: any error yields `maintenance = true, bypass = false`.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::{BypassPolicy, GateConfig, StorageKeys};
use crate::credentials::CredentialStore;
use crate::error::{GateError, GateResult};
use crate::resolver::{SessionCheck, Verdict};
use crate::store::KeyValueStore;

/// Persisted maintenance settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceState {
    /// Whether maintenance mode is on.
    pub enabled: bool,
    /// Announced end of the maintenance window.
    pub end_date: Option<String>,
    /// Message shown on the maintenance page.
    pub message: Option<String>,
}

impl MaintenanceState {
    /// Load the settings from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error when storage is unreadable or the flag holds a value
    /// other than `true`/`false`.
    pub fn load(storage: &dyn KeyValueStore, keys: &StorageKeys) -> GateResult<Self> {
        let enabled = match read(storage, &keys.maintenance_mode)? {
            Some(raw) => parse_flag(&keys.maintenance_mode, &raw)?,
            None => false,
        };
        Ok(Self {
            enabled,
            end_date: read_text(storage, &keys.maintenance_end_date)?,
            message: read_text(storage, &keys.maintenance_message)?,
        })
    }
}

/// Outcome of a maintenance check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaintenanceCheck {
    /// Maintenance mode is in force (or could not be ruled out).
    pub maintenance: bool,
    /// The visitor may see the live site anyway.
    pub bypass: bool,
}

impl MaintenanceCheck {
    /// Site is up; nothing to bypass.
    pub const OPEN: Self = Self {
        maintenance: false,
        bypass: false,
    };
    /// Fail-closed outcome.
    pub const CLOSED: Self = Self {
        maintenance: true,
        bypass: false,
    };

    /// Whether the visitor must be sent to the maintenance boundary.
    #[must_use]
    pub const fn blocks(self) -> bool {
        self.maintenance && !self.bypass
    }
}

/// Decides whether maintenance mode keeps the visitor out.
#[derive(Clone)]
pub struct MaintenanceGate {
    storage: Rc<dyn KeyValueStore>,
    credentials: CredentialStore,
    session: Rc<dyn SessionCheck>,
    config: Rc<GateConfig>,
}

impl MaintenanceGate {
    /// Build a gate over the given collaborators.
    #[must_use]
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        credentials: CredentialStore,
        session: Rc<dyn SessionCheck>,
        config: Rc<GateConfig>,
    ) -> Self {
        Self {
            storage,
            credentials,
            session,
            config,
        }
    }

    /// Current persisted maintenance settings.
    ///
    /// # Errors
    ///
    /// See [`MaintenanceState::load`].
    pub fn state(&self) -> GateResult<MaintenanceState> {
        MaintenanceState::load(self.storage.as_ref(), &self.config.keys)
    }

    /// Evaluate maintenance mode and the operator bypass.
    pub async fn check(&self) -> MaintenanceCheck {
        let state = match self.state() {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "maintenance settings unreadable; failing closed");
                return MaintenanceCheck::CLOSED;
            }
        };
        if !state.enabled {
            return MaintenanceCheck::OPEN;
        }

        let authenticated = self.session.resolve().await == Verdict::Authenticated;
        let operator = self.credentials.is_operator();
        let bypass = match self.config.maintenance_bypass {
            BypassPolicy::AnyCredential => authenticated || operator,
            BypassPolicy::OperatorOnly => authenticated && operator,
        };
        debug!(authenticated, operator, bypass, "maintenance mode active");
        MaintenanceCheck {
            maintenance: true,
            bypass,
        }
    }
}

fn read(storage: &dyn KeyValueStore, key: &str) -> GateResult<Option<String>> {
    storage.get(key).map_err(|source| GateError::Storage {
        operation: "maintenance.read",
        source,
    })
}

fn read_text(storage: &dyn KeyValueStore, key: &str) -> GateResult<Option<String>> {
    Ok(read(storage, key)?
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn parse_flag(key: &str, raw: &str) -> GateResult<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(GateError::InvalidSetting {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }
}
