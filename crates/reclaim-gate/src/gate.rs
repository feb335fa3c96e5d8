//! Facade wiring the gate components together.
//!
//! # Design
//! - One `AccessGate` per application; guards share it by reference.
//! - Construction takes the three host-specific collaborators (storage,
//!   identity provider, clock) and the configuration; everything else is
//!   derived from them.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::GateConfig;
use crate::credentials::{CredentialKind, CredentialRecord, CredentialStore};
use crate::error::{GateError, GateResult};
use crate::guard::{Boundary, GuardDecision, GuardKind, RouteGuard, Ticket};
use crate::identity::{AuthEvent, IdentityProvider, Subscription};
use crate::maintenance::{MaintenanceGate, MaintenanceState};
use crate::resolver::{SessionResolver, Verdict};
use crate::store::KeyValueStore;
use crate::subscriber::AuthEventSubscriber;

/// Credentials submitted from the login boundary.
#[derive(Clone)]
pub struct SignInRequest {
    /// Account email.
    pub email: String,
    /// Account password; never logged.
    pub password: String,
    /// Opt into the long-lived remembered record.
    pub remember: bool,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignInRequest")
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}

/// The client-side access gate.
#[derive(Clone)]
pub struct AccessGate {
    config: Rc<GateConfig>,
    clock: Rc<dyn Clock>,
    provider: Rc<dyn IdentityProvider>,
    credentials: CredentialStore,
    resolver: Rc<SessionResolver>,
    maintenance: MaintenanceGate,
    subscriber: AuthEventSubscriber,
}

impl AccessGate {
    /// Assemble a gate from host collaborators.
    #[must_use]
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        provider: Rc<dyn IdentityProvider>,
        clock: Rc<dyn Clock>,
        config: GateConfig,
    ) -> Self {
        let config = Rc::new(config);
        let credentials = CredentialStore::new(Rc::clone(&storage), Rc::clone(&config));
        let resolver = Rc::new(SessionResolver::new(
            credentials.clone(),
            Rc::clone(&provider),
            Rc::clone(&clock),
            Rc::clone(&config),
        ));
        let maintenance = MaintenanceGate::new(
            storage,
            credentials.clone(),
            resolver.clone(),
            Rc::clone(&config),
        );
        let subscriber = AuthEventSubscriber::new(Rc::clone(&provider), credentials.clone());
        Self {
            config,
            clock,
            provider,
            credentials,
            resolver,
            maintenance,
            subscriber,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Route path of `boundary`.
    #[must_use]
    pub fn boundary_path(&self, boundary: Boundary) -> &str {
        boundary.path(&self.config)
    }

    /// Credential store backing this gate.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Session resolver backing this gate.
    #[must_use]
    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    /// Maintenance gate backing this gate.
    #[must_use]
    pub const fn maintenance(&self) -> &MaintenanceGate {
        &self.maintenance
    }

    /// Latest verdict pushed by auth events.
    #[must_use]
    pub fn pushed_verdict(&self) -> Verdict {
        self.subscriber.verdict()
    }

    /// Run one evaluation pass for a guard of `kind`. Never returns `Pending`.
    pub async fn evaluate(&self, kind: GuardKind) -> Verdict {
        let verdict = match kind {
            GuardKind::Protected => self.resolver.resolve_detailed().await.verdict,
            GuardKind::Maintenance => {
                if self.maintenance.check().await.blocks() {
                    Verdict::Unauthenticated
                } else {
                    Verdict::Authenticated
                }
            }
        };
        debug!(guard = kind.as_str(), verdict = verdict.as_str(), "guard evaluated");
        verdict
    }

    /// Evaluate for `guard` and apply the result if `ticket` is still current.
    ///
    /// Returns the decision to render, or `None` when the result was stale.
    pub async fn run_guard(
        &self,
        guard: &RefCell<RouteGuard>,
        ticket: Ticket,
    ) -> Option<GuardDecision> {
        let kind = guard.borrow().kind();
        let verdict = self.evaluate(kind).await;
        let decision = guard.borrow_mut().complete(ticket, verdict);
        if decision.is_none() {
            debug!(guard = kind.as_str(), "discarding stale guard result");
        }
        decision
    }

    /// Listen for auth changes; sign-out purges local records first.
    pub fn subscribe(&self, on_change: impl Fn(&AuthEvent) + 'static) -> Subscription {
        self.subscriber.subscribe(on_change)
    }

    /// Current maintenance settings for display on the maintenance boundary.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings cannot be read.
    pub fn maintenance_state(&self) -> GateResult<MaintenanceState> {
        self.maintenance.state()
    }

    /// Sign in with the provider and record the local credential.
    ///
    /// Writes exactly one record, `remembered` when requested and `standard`
    /// otherwise, and removes the other kind.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::SignIn`] when the provider refuses or fails, and a
    /// storage error when the record cannot be written.
    pub async fn sign_in(&self, request: &SignInRequest) -> GateResult<()> {
        let email = request.email.trim();
        self.provider
            .sign_in_with_password(email, &request.password)
            .await
            .map_err(|source| GateError::SignIn { source })?;

        let kind = if request.remember {
            CredentialKind::Remembered
        } else {
            CredentialKind::Standard
        };
        // The operator flag goes first so a stored record never lacks it.
        let operator = self.config.is_operator_email(email);
        if operator {
            self.credentials.mark_operator()?;
        } else {
            self.credentials.clear_operator();
        }

        let record = CredentialRecord::new(self.clock.now_ms(), email);
        if let Err(err) = self.credentials.write(kind, &record) {
            self.credentials.clear_operator();
            return Err(err);
        }
        self.credentials.clear(kind.other());
        info!(kind = kind.as_str(), operator, "signed in");
        Ok(())
    }

    /// Sign out with the provider and drop every local record.
    ///
    /// Local records are cleared even when the provider cannot be reached.
    pub async fn sign_out(&self) {
        if let Err(err) = self.provider.sign_out().await {
            warn!(error = %err, "remote sign-out failed; clearing local records anyway");
        }
        self.credentials.clear_all();
        info!("signed out");
    }
}
