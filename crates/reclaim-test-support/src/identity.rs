//! Scripted identity provider with call counters.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use reclaim_gate::{
    AuthEvent, AuthEvents, AuthHandler, IdentityError, IdentityProvider, Session, Subscription,
};
use serde_json::json;

/// How `current_session` answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteSession {
    /// A live session exists.
    Active,
    /// No session.
    Absent,
    /// The provider cannot be reached.
    Unreachable,
}

/// In-memory identity provider.
///
/// Accepts exactly one email/password pair. Successful sign-in and sign-out
/// push the matching auth event, as a real provider does.
pub struct FakeIdentity {
    remote: Cell<RemoteSession>,
    account: RefCell<Option<(String, String)>>,
    events: AuthEvents,
    session_calls: Cell<usize>,
    sign_in_calls: Cell<usize>,
    sign_out_calls: Cell<usize>,
}

impl FakeIdentity {
    /// Provider answering `current_session` with `remote`.
    #[must_use]
    pub fn new(remote: RemoteSession) -> Self {
        Self {
            remote: Cell::new(remote),
            account: RefCell::new(None),
            events: AuthEvents::new(),
            session_calls: Cell::new(0),
            sign_in_calls: Cell::new(0),
            sign_out_calls: Cell::new(0),
        }
    }

    /// Accept `email`/`password` at sign-in.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        *self.account.borrow_mut() = Some((email.to_string(), password.to_string()));
        self
    }

    /// Change the remote session answer.
    pub fn set_remote(&self, remote: RemoteSession) {
        self.remote.set(remote);
    }

    /// Push `event` to every listener, as the provider would from another tab.
    pub fn push(&self, event: &AuthEvent) {
        self.events.emit(event);
    }

    /// Number of `current_session` calls so far.
    #[must_use]
    pub fn session_calls(&self) -> usize {
        self.session_calls.get()
    }

    /// Number of `sign_in_with_password` calls so far.
    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.get()
    }

    /// Number of `sign_out` calls so far.
    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.get()
    }

    /// Number of registered auth listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeIdentity {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        self.session_calls.set(self.session_calls.get() + 1);
        match self.remote.get() {
            RemoteSession::Active => Ok(Some(Session::from_payload(
                json!({"access_token": "fake-token"}),
            ))),
            RemoteSession::Absent => Ok(None),
            RemoteSession::Unreachable => Err(IdentityError::Unavailable {
                detail: "fake provider offline".to_string(),
            }),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        self.sign_in_calls.set(self.sign_in_calls.get() + 1);
        if self.remote.get() == RemoteSession::Unreachable {
            return Err(IdentityError::Unavailable {
                detail: "fake provider offline".to_string(),
            });
        }
        let accepted = self
            .account
            .borrow()
            .as_ref()
            .is_some_and(|(known_email, known_password)| {
                known_email == email && known_password == password
            });
        if !accepted {
            return Err(IdentityError::Rejected {
                message: "Invalid login credentials".to_string(),
            });
        }
        self.remote.set(RemoteSession::Active);
        self.events.emit(&AuthEvent::SignedIn(Session::opaque()));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        if self.remote.get() == RemoteSession::Unreachable {
            return Err(IdentityError::Unavailable {
                detail: "fake provider offline".to_string(),
            });
        }
        self.remote.set(RemoteSession::Absent);
        self.events.emit(&AuthEvent::SignedOut);
        Ok(())
    }

    fn on_auth_state_change(&self, handler: AuthHandler) -> Subscription {
        self.events.subscribe(handler)
    }
}
