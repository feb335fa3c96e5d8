//! Time constants and storage seeding helpers.

use reclaim_gate::{KeyValueStore, MemoryStorage};

/// Fixed "now" used by integration suites (2025-10-09T08:53:20Z).
pub const NOW_MS: i64 = 1_760_000_000_000;
/// One hour in milliseconds.
pub const HOUR_MS: i64 = 3_600_000;
/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Store a credential record JSON under `key`, captured `age_ms` before
/// [`NOW_MS`].
///
/// # Panics
///
/// Panics if the in-memory store rejects the write.
pub fn seed_record(storage: &MemoryStorage, key: &str, age_ms: i64) {
    let raw = format!(
        "{{\"timestamp\":{},\"email\":\"clerk@reclaim.example\"}}",
        NOW_MS - age_ms
    );
    seed_raw(storage, key, &raw);
}

/// Store `raw` verbatim under `key`.
///
/// # Panics
///
/// Panics if the in-memory store rejects the write.
pub fn seed_raw(storage: &MemoryStorage, key: &str, raw: &str) {
    storage
        .set(key, raw)
        .expect("in-memory storage accepts writes");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_record_writes_aged_json() {
        let storage = MemoryStorage::new();
        seed_record(&storage, "adminAuth", 2 * HOUR_MS);
        let raw = storage
            .get("adminAuth")
            .expect("readable")
            .expect("present");
        assert!(raw.contains(&format!("\"timestamp\":{}", NOW_MS - 2 * HOUR_MS)));
    }
}
