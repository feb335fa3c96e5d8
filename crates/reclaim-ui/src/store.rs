//! App-wide yewdux store.
//!
//! # Design
//! - Mirrors the pushed session verdict so views never poll the provider.
//! - Login form progress lives here so a remount keeps the last error.

use reclaim_gate::{AuthEvent, MaintenanceState, Verdict};
use yewdux::store::Store;

/// Global gate-related UI state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Store)]
pub struct GateStore {
    /// Latest verdict pushed by auth events.
    pub verdict: Verdict,
    /// Login form state.
    pub login: LoginSlice,
}

/// Login form progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginSlice {
    /// A sign-in request is in flight.
    pub busy: bool,
    /// Last sign-in failure, ready for display.
    pub error: Option<String>,
}

/// Descriptive maintenance details for the maintenance page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaintenanceNotice {
    /// Operator message.
    pub message: Option<String>,
    /// Expected end, as stored.
    pub end_date: Option<String>,
}

impl From<&MaintenanceState> for MaintenanceNotice {
    fn from(state: &MaintenanceState) -> Self {
        Self {
            message: state.message.clone(),
            end_date: state.end_date.clone(),
        }
    }
}

/// Fold a pushed auth event into the store.
pub fn apply_auth_event(store: &mut GateStore, event: &AuthEvent) {
    match event {
        AuthEvent::SignedIn(_) => {
            store.verdict = Verdict::Authenticated;
            store.login = LoginSlice::default();
        }
        AuthEvent::SignedOut => store.verdict = Verdict::Unauthenticated,
    }
}

/// Mark a sign-in attempt as started.
pub fn begin_sign_in(store: &mut GateStore) {
    store.login.busy = true;
    store.login.error = None;
}

/// Record the outcome of a sign-in attempt.
pub fn finish_sign_in(store: &mut GateStore, error: Option<String>) {
    store.login.busy = false;
    store.login.error = error;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_gate::Session;

    #[test]
    fn auth_events_drive_the_verdict() {
        let mut store = GateStore::default();
        assert_eq!(store.verdict, Verdict::Pending);

        apply_auth_event(&mut store, &AuthEvent::SignedIn(Session::opaque()));
        assert_eq!(store.verdict, Verdict::Authenticated);

        apply_auth_event(&mut store, &AuthEvent::SignedOut);
        assert_eq!(store.verdict, Verdict::Unauthenticated);
    }

    #[test]
    fn sign_in_clears_a_previous_error() {
        let mut store = GateStore::default();
        begin_sign_in(&mut store);
        finish_sign_in(&mut store, Some("Invalid email or password.".to_string()));
        assert!(!store.login.busy);
        assert!(store.login.error.is_some());

        begin_sign_in(&mut store);
        assert!(store.login.busy);
        assert_eq!(store.login.error, None);

        apply_auth_event(&mut store, &AuthEvent::SignedIn(Session::opaque()));
        assert_eq!(store.login, LoginSlice::default());
    }

    #[test]
    fn maintenance_notice_copies_descriptive_fields() {
        let state = MaintenanceState {
            enabled: true,
            end_date: Some("2026-10-17T06:00:00Z".to_string()),
            message: None,
        };
        let notice = MaintenanceNotice::from(&state);
        assert_eq!(notice.end_date.as_deref(), Some("2026-10-17T06:00:00Z"));
        assert_eq!(notice.message, None);
    }
}
