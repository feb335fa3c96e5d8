//! Remote identity provider collaborator and its push notifications.
//!
//! # Design
//! - The provider is opaque: the gate only asks whether a session exists.
//! - Notifications are push-based; listeners live until their
//!   [`Subscription`] is released or dropped.
//! - Everything here is single-threaded (`Rc`/`RefCell`), matching the
//!   browser event loop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::IdentityError;

/// Opaque session payload handed out by the identity provider.
#[derive(Clone, PartialEq)]
pub struct Session {
    payload: Value,
}

impl Session {
    /// Wrap a provider payload without interpreting it.
    #[must_use]
    pub const fn from_payload(payload: Value) -> Self {
        Self { payload }
    }

    /// Session known to exist but whose payload is not available locally.
    #[must_use]
    pub const fn opaque() -> Self {
        Self {
            payload: Value::Null,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Session payloads may carry bearer tokens.
        let has_payload = !self.payload.is_null();
        formatter
            .debug_struct("Session")
            .field("has_payload", &has_payload)
            .finish()
    }
}

/// Authentication change pushed by the identity provider.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    /// A session became active.
    SignedIn(Session),
    /// The session ended, locally or in another tab.
    SignedOut,
}

impl AuthEvent {
    /// Stable label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed-in",
            Self::SignedOut => "signed-out",
        }
    }
}

/// Listener invoked for every auth event.
pub type AuthHandler = Rc<dyn Fn(&AuthEvent)>;

/// Handle that keeps a listener registered; releasing it unregisters.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Subscription that runs `release` when unsubscribed or dropped.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Subscription with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Unregister the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, AuthHandler)>>,
}

/// Listener registry providers embed to implement
/// [`IdentityProvider::on_auth_state_change`].
#[derive(Clone, Default)]
pub struct AuthEvents {
    listeners: Rc<Listeners>,
}

impl AuthEvents {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` until the returned subscription is released.
    pub fn subscribe(&self, handler: AuthHandler) -> Subscription {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id.wrapping_add(1));
        self.listeners.entries.borrow_mut().push((id, handler));

        let weak: Weak<Listeners> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners
                    .entries
                    .borrow_mut()
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Listeners may subscribe or unsubscribe while being notified; the set
    /// notified is the one registered when emission started.
    pub fn emit(&self, event: &AuthEvent) {
        let snapshot: Vec<AuthHandler> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.entries.borrow().len()
    }
}

/// Remote identity provider consumed by the gate.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Fetch the provider's current session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot be reached.
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Rejected`] for bad credentials and
    /// [`IdentityError::Unavailable`] for transport failures.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<(), IdentityError>;

    /// End the provider session.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider cannot be reached.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Register for sign-in/sign-out notifications.
    fn on_auth_state_change(&self, handler: AuthHandler) -> Subscription;
}
