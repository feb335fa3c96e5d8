//! Push updates from the identity provider.
//!
//! # Design
//! - Signed-out clears every local credential record before any listener
//!   runs, so a listener that re-resolves sees the cleared store.
//! - The latest verdict is kept here so callers never poll the provider.

use std::cell::Cell;
use std::rc::Rc;

use tracing::info;

use crate::credentials::CredentialStore;
use crate::identity::{AuthEvent, AuthHandler, IdentityProvider, Subscription};
use crate::resolver::Verdict;

/// Wraps the provider's notification channel for the gate.
#[derive(Clone)]
pub struct AuthEventSubscriber {
    provider: Rc<dyn IdentityProvider>,
    credentials: CredentialStore,
    verdict: Rc<Cell<Verdict>>,
}

impl AuthEventSubscriber {
    /// Build a subscriber over `provider` that purges `credentials` on sign-out.
    #[must_use]
    pub fn new(provider: Rc<dyn IdentityProvider>, credentials: CredentialStore) -> Self {
        Self {
            provider,
            credentials,
            verdict: Rc::new(Cell::new(Verdict::Pending)),
        }
    }

    /// Latest verdict pushed by the provider; `Pending` until the first event.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict.get()
    }

    /// Listen for auth changes until the returned subscription is released.
    pub fn subscribe(&self, on_change: impl Fn(&AuthEvent) + 'static) -> Subscription {
        let credentials = self.credentials.clone();
        let verdict = Rc::clone(&self.verdict);
        let handler: AuthHandler = Rc::new(move |event: &AuthEvent| {
            match event {
                AuthEvent::SignedIn(_) => verdict.set(Verdict::Authenticated),
                AuthEvent::SignedOut => {
                    credentials.clear_all();
                    verdict.set(Verdict::Unauthenticated);
                    info!("signed out; local credential records cleared");
                }
            }
            on_change(event);
        });
        self.provider.on_auth_state_change(handler)
    }
}
