//! Locally persisted credential records.
//!
//! # Design
//! - This is the only component that reads or writes credential keys.
//! - Records are immutable once written; they are replaced or deleted, never
//!   edited in place.
//! - A record that fails to decode is corrupt: it is deleted synchronously and
//!   reported as absent. Decode errors never leave this module.

use std::fmt;
use std::rc::Rc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::store::KeyValueStore;

/// Persisted credential kinds, in resolution priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Long-lived record written when the user opted into "remember me".
    Remembered,
    /// Short-lived default record.
    Standard,
}

impl CredentialKind {
    /// Kinds in the order the resolver consults them.
    pub const PRIORITY: [Self; 2] = [Self::Remembered, Self::Standard];

    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remembered => "remembered",
            Self::Standard => "standard",
        }
    }

    /// Expiry window for this kind under `config`.
    #[must_use]
    pub fn expiry_window(self, config: &GateConfig) -> Duration {
        match self {
            Self::Remembered => config.remembered_window(),
            Self::Standard => config.standard_window(),
        }
    }

    /// Storage key holding this kind under `config`.
    #[must_use]
    pub fn storage_key(self, config: &GateConfig) -> &str {
        match self {
            Self::Remembered => &config.keys.remembered,
            Self::Standard => &config.keys.standard,
        }
    }

    /// The other persisted kind.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Remembered => Self::Standard,
            Self::Standard => Self::Remembered,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Where an authenticated verdict came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// A fresh remembered record.
    Remembered,
    /// A fresh standard record.
    Standard,
    /// The remote provider's own session.
    Live,
}

impl From<CredentialKind> for CredentialSource {
    fn from(kind: CredentialKind) -> Self {
        match kind {
            CredentialKind::Remembered => Self::Remembered,
            CredentialKind::Standard => Self::Standard,
        }
    }
}

/// Timestamped token of a prior successful sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Capture time in epoch milliseconds.
    pub timestamp: i64,
    /// Account that signed in.
    #[serde(default)]
    pub email: String,
}

impl CredentialRecord {
    /// Record captured at `timestamp` for `email`.
    #[must_use]
    pub fn new(timestamp: i64, email: impl Into<String>) -> Self {
        Self {
            timestamp,
            email: email.into(),
        }
    }

    /// Age of the record at `now_ms`; negative when the record is future-dated.
    #[must_use]
    pub const fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    /// Whether the record is still inside `window` at `now_ms`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, window: Duration) -> bool {
        let age = self.age_ms(now_ms);
        age >= 0 && age < window.num_milliseconds()
    }
}

/// Reads and writes credential records in persisted storage.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Rc<dyn KeyValueStore>,
    config: Rc<GateConfig>,
}

impl CredentialStore {
    /// Wrap `storage` using the keys in `config`.
    #[must_use]
    pub fn new(storage: Rc<dyn KeyValueStore>, config: Rc<GateConfig>) -> Self {
        Self { storage, config }
    }

    /// Read the record of `kind`, purging it if it is corrupt.
    ///
    /// Backend read failures are logged and reported as absent.
    #[must_use]
    pub fn read(&self, kind: CredentialKind) -> Option<CredentialRecord> {
        let key = kind.storage_key(&self.config);
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "credential read failed; treating as absent");
                return None;
            }
        };

        match decode_record(key, &raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(key, error = %err, "purging corrupt credential record");
                self.remove_key(key);
                None
            }
        }
    }

    /// Persist `record` as `kind`, replacing any existing record of that kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or stored.
    pub fn write(&self, kind: CredentialKind, record: &CredentialRecord) -> GateResult<()> {
        let key = kind.storage_key(&self.config);
        let encoded = serde_json::to_string(record).map_err(|source| GateError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage
            .set(key, &encoded)
            .map_err(|source| GateError::Storage {
                operation: "credentials.write",
                source,
            })?;
        debug!(kind = kind.as_str(), "credential record written");
        Ok(())
    }

    /// Remove the record of `kind`.
    pub fn clear(&self, kind: CredentialKind) {
        self.remove_key(kind.storage_key(&self.config));
    }

    /// Remove every credential record and the operator flag.
    pub fn clear_all(&self) {
        for kind in CredentialKind::PRIORITY {
            self.clear(kind);
        }
        self.remove_key(&self.config.keys.operator);
    }

    /// Record that the signed-in account is an operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be stored.
    pub fn mark_operator(&self) -> GateResult<()> {
        self.storage
            .set(&self.config.keys.operator, "true")
            .map_err(|source| GateError::Storage {
                operation: "credentials.mark_operator",
                source,
            })
    }

    /// Remove the operator flag.
    pub fn clear_operator(&self) {
        self.remove_key(&self.config.keys.operator);
    }

    /// Whether the operator flag is set. Unreadable storage counts as unset.
    #[must_use]
    pub fn is_operator(&self) -> bool {
        match self.storage.get(&self.config.keys.operator) {
            Ok(value) => value.is_some_and(|raw| raw.trim() == "true"),
            Err(err) => {
                warn!(error = %err, "operator flag read failed; treating as unset");
                false
            }
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            error!(key, error = %err, "failed to remove credential key");
        }
    }
}

fn decode_record(key: &str, raw: &str) -> GateResult<CredentialRecord> {
    serde_json::from_str(raw).map_err(|source| GateError::CorruptRecord {
        key: key.to_string(),
        source,
    })
}
