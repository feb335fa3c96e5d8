//! Error types for the access gate.
//!
//! # Design
//! - Resolution paths never surface these to callers; they log and degrade.
//! - Only explicit operator actions (sign-in, record writes, config parsing)
//!   return them.

use thiserror::Error;

/// Failure reported by a key/value storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is not reachable (disabled, sandboxed, or missing).
    #[error("storage unavailable")]
    Unavailable {
        /// Backend-specific detail.
        detail: String,
    },
    /// The backend refused the write because it is full.
    #[error("storage quota exceeded")]
    QuotaExceeded {
        /// Key being written.
        key: String,
    },
}

/// Failure reported by the remote identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Provider could not be reached or timed out.
    #[error("identity provider unavailable: {detail}")]
    Unavailable {
        /// Transport-level detail.
        detail: String,
    },
    /// Provider answered and refused the request.
    #[error("identity provider rejected the request: {message}")]
    Rejected {
        /// Provider-supplied, user-presentable message.
        message: String,
    },
}

/// Primary error type for gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// Storage backend failed.
    #[error("storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source storage error.
        source: StorageError,
    },
    /// A persisted record could not be decoded.
    #[error("corrupt record under '{key}'")]
    CorruptRecord {
        /// Storage key holding the record.
        key: String,
        /// Decoder error.
        source: serde_json::Error,
    },
    /// A persisted setting held a value outside its domain.
    #[error("invalid value for setting '{key}'")]
    InvalidSetting {
        /// Storage key holding the setting.
        key: String,
        /// Offending raw value.
        value: String,
    },
    /// A record could not be encoded for storage.
    #[error("failed to encode record for '{key}'")]
    Encode {
        /// Storage key being written.
        key: String,
        /// Encoder error.
        source: serde_json::Error,
    },
    /// Gate configuration failed validation.
    #[error("invalid gate configuration field '{field}': {reason}")]
    InvalidConfig {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Gate configuration document could not be parsed.
    #[error("failed to parse gate configuration")]
    ConfigParse {
        /// Decoder error.
        source: serde_json::Error,
    },
    /// Identity provider refused or failed a sign-in.
    #[error("sign-in failed")]
    SignIn {
        /// Provider error.
        source: IdentityError,
    },
}

/// Convenience alias for gate results.
pub type GateResult<T> = Result<T, GateError>;
