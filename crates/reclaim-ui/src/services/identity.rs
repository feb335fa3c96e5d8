//! HTTP identity client.
//!
//! # Design
//! - One client per app boot; it owns the auth listener registry.
//! - Emits `SignedIn`/`SignedOut` after its own successful calls and turns
//!   credential changes made by other tabs into the same events.
//! - Transport errors never escape as panics; they map to
//!   [`IdentityError::Unavailable`].

use std::rc::Rc;

use async_trait::async_trait;
use gloo::events::EventListener;
use gloo::utils::window;
use gloo_net::http::{Request, Response};
use reclaim_gate::{
    AuthEvent, AuthEvents, AuthHandler, IdentityError, IdentityProvider, KeyValueStore, Session,
    StorageKeys, Subscription,
};
use serde_json::Value;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

use crate::cross_tab::{classify_storage_change, credential_present};
use crate::protocol::{
    LOGIN_PATH, LOGOUT_PATH, LoginBody, SESSION_PATH, StatusClass, classify_status, endpoint,
    rejection_message,
};

/// Identity provider speaking to the console's auth endpoints.
pub(crate) struct HttpIdentityClient {
    base_url: String,
    events: AuthEvents,
    _storage_listener: EventListener,
}

impl HttpIdentityClient {
    /// Build a client for `base_url` and start listening for other tabs.
    pub(crate) fn new(
        base_url: impl Into<String>,
        keys: StorageKeys,
        storage: Rc<dyn KeyValueStore>,
    ) -> Self {
        let events = AuthEvents::new();
        let storage_listener = {
            let events = events.clone();
            EventListener::new(&window(), "storage", move |event| {
                let Some(event) = event.dyn_ref::<StorageEvent>() else {
                    return;
                };
                let key = event.key();
                let new_value = event.new_value();
                let present = credential_present(storage.as_ref(), &keys);
                if let Some(change) =
                    classify_storage_change(&keys, key.as_deref(), new_value.as_deref(), present)
                {
                    debug!(event = change.kind(), "auth change from another tab");
                    events.emit(&change);
                }
            })
        };
        Self {
            base_url: base_url.into(),
            events,
            _storage_listener: storage_listener,
        }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

async fn send(request: Request) -> anyhow::Result<Response> {
    Ok(request.send().await?)
}

fn unavailable(err: &anyhow::Error) -> IdentityError {
    IdentityError::Unavailable {
        detail: format!("{err:#}"),
    }
}

fn unexpected_status(path: &str, status: u16) -> IdentityError {
    IdentityError::Unavailable {
        detail: format!("{path} returned HTTP {status}"),
    }
}

#[async_trait(?Send)]
impl IdentityProvider for HttpIdentityClient {
    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let response = send(Request::get(&self.url(SESSION_PATH)))
            .await
            .map_err(|err| unavailable(&err))?;
        match classify_status(response.status()) {
            StatusClass::Success => {
                let payload = response.json::<Value>().await.unwrap_or(Value::Null);
                Ok((!payload.is_null()).then(|| Session::from_payload(payload)))
            }
            StatusClass::Refused => Ok(None),
            StatusClass::Failure => Err(unexpected_status(SESSION_PATH, response.status())),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let request = Request::post(&self.url(LOGIN_PATH))
            .json(&LoginBody { email, password })
            .map_err(|err| unavailable(&anyhow::Error::from(err)))?;
        let response = send(request).await.map_err(|err| unavailable(&err))?;
        match classify_status(response.status()) {
            StatusClass::Success => {
                let payload = response.json::<Value>().await.unwrap_or(Value::Null);
                self.events
                    .emit(&AuthEvent::SignedIn(Session::from_payload(payload)));
                Ok(())
            }
            StatusClass::Refused => {
                let body = response.text().await.ok();
                Err(IdentityError::Rejected {
                    message: rejection_message(body.as_deref()),
                })
            }
            StatusClass::Failure => Err(unexpected_status(LOGIN_PATH, response.status())),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let response = send(Request::post(&self.url(LOGOUT_PATH)))
            .await
            .map_err(|err| unavailable(&err))?;
        match classify_status(response.status()) {
            // A refused sign-out means the session was already gone.
            StatusClass::Success | StatusClass::Refused => {
                self.events.emit(&AuthEvent::SignedOut);
                Ok(())
            }
            StatusClass::Failure => {
                warn!(status = response.status(), "sign-out endpoint failed");
                Err(unexpected_status(LOGOUT_PATH, response.status()))
            }
        }
    }

    fn on_auth_state_change(&self, handler: AuthHandler) -> Subscription {
        self.events.subscribe(handler)
    }
}
