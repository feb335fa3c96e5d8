//! `localStorage` and wall-clock adapters.
//!
//! # Design
//! - The storage handle is fetched per call; a sandboxed or disabled store
//!   surfaces as [`StorageError::Unavailable`] instead of a panic, so the gate
//!   can fail closed.

use gloo::utils::window;
use js_sys::Date;
use reclaim_gate::{Clock, KeyValueStore, StorageError};
use wasm_bindgen::JsValue;

/// Persisted storage backed by `window.localStorage`.
#[derive(Debug, Default)]
pub(crate) struct BrowserStorage;

impl BrowserStorage {
    fn backend() -> Result<web_sys::Storage, StorageError> {
        window()
            .local_storage()
            .map_err(|err| unavailable(&err))?
            .ok_or_else(|| StorageError::Unavailable {
                detail: "localStorage is not available".to_string(),
            })
    }
}

fn unavailable(err: &JsValue) -> StorageError {
    StorageError::Unavailable {
        detail: err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::backend()?.get_item(key).map_err(|err| unavailable(&err))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::backend()?
            .set_item(key, value)
            .map_err(|_| StorageError::QuotaExceeded {
                key: key.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::backend()?
            .remove_item(key)
            .map_err(|err| unavailable(&err))
    }
}

/// Wall clock read from `Date.now()`.
#[derive(Debug, Default)]
pub(crate) struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> i64 {
        Date::now() as i64
    }
}
