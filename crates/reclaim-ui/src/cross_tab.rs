//! Turn browser `storage` events from other tabs into auth events.
//!
//! # Design
//! - Only the two credential keys matter; every other key is ignored.
//! - A removal only counts as a sign-out once no credential record remains,
//!   because sign-in in another tab writes one kind and removes the other.

use reclaim_gate::{AuthEvent, KeyValueStore, Session, StorageKeys};

/// Whether any credential record is present in `storage`.
///
/// An unreadable backend counts as empty.
#[must_use]
pub fn credential_present(storage: &dyn KeyValueStore, keys: &StorageKeys) -> bool {
    [&keys.standard, &keys.remembered]
        .into_iter()
        .any(|key| matches!(storage.get(key), Ok(Some(_))))
}

/// Classify a `storage` event.
///
/// `key` is `None` when another tab cleared the whole store. `present` is
/// [`credential_present`] evaluated after the change.
#[must_use]
pub fn classify_storage_change(
    keys: &StorageKeys,
    key: Option<&str>,
    new_value: Option<&str>,
    present: bool,
) -> Option<AuthEvent> {
    let Some(key) = key else {
        return (!present).then_some(AuthEvent::SignedOut);
    };
    if key != keys.standard && key != keys.remembered {
        return None;
    }
    match new_value {
        Some(_) => Some(AuthEvent::SignedIn(Session::opaque())),
        None if !present => Some(AuthEvent::SignedOut),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_gate::MemoryStorage;
    use reclaim_test_support::fixtures::{HOUR_MS, seed_record};
    use reclaim_test_support::storage::UnavailableStorage;

    #[test]
    fn credential_write_in_another_tab_signs_in() {
        let keys = StorageKeys::default();
        let event = classify_storage_change(&keys, Some("adminAuth"), Some("{}"), true);
        assert_eq!(event, Some(AuthEvent::SignedIn(Session::opaque())));
    }

    #[test]
    fn last_credential_removed_signs_out() {
        let keys = StorageKeys::default();
        assert_eq!(
            classify_storage_change(&keys, Some("adminAuthRemembered"), None, false),
            Some(AuthEvent::SignedOut)
        );
        assert_eq!(
            classify_storage_change(&keys, None, None, false),
            Some(AuthEvent::SignedOut)
        );
    }

    #[test]
    fn removing_the_other_kind_during_sign_in_is_ignored() {
        let keys = StorageKeys::default();
        assert_eq!(
            classify_storage_change(&keys, Some("adminAuth"), None, true),
            None
        );
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let keys = StorageKeys::default();
        assert_eq!(
            classify_storage_change(&keys, Some("maintenanceMode"), Some("true"), false),
            None
        );
    }

    #[test]
    fn presence_reads_both_credential_keys() {
        let keys = StorageKeys::default();
        let storage = MemoryStorage::new();
        assert!(!credential_present(&storage, &keys));

        seed_record(&storage, "adminAuthRemembered", HOUR_MS);
        assert!(credential_present(&storage, &keys));
        assert!(!credential_present(&UnavailableStorage, &keys));
    }
}
