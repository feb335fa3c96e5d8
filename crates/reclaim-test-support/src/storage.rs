//! Storage backend that refuses every operation.

use reclaim_gate::{KeyValueStore, StorageError};

/// Mimics a browser with storage disabled.
#[derive(Debug, Default)]
pub struct UnavailableStorage;

impl UnavailableStorage {
    fn error() -> StorageError {
        StorageError::Unavailable {
            detail: "storage disabled".to_string(),
        }
    }
}

impl KeyValueStore for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(Self::error())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(Self::error())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(Self::error())
    }
}
