//! Session resolution: local credential records first, then the remote session.
//!
//! # Design
//! - Strict priority: remembered, standard, live. The first fresh source wins
//!   and nothing after it runs, so a fresh local record never costs a network
//!   round-trip.
//! - Local reads always finish before the remote call is issued.
//! - Expired or future-dated records are purged as they are encountered.
//! - Remote failures are logged and resolve to `Unauthenticated`; this
//!   component never returns an error.

use std::rc::Rc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::GateConfig;
use crate::credentials::{CredentialKind, CredentialSource, CredentialStore};
use crate::identity::IdentityProvider;

/// Authentication decision consumed by route guards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verdict {
    /// Resolution has not finished.
    #[default]
    Pending,
    /// The visitor holds a valid credential or session.
    Authenticated,
    /// The visitor must sign in.
    Unauthenticated,
}

impl Verdict {
    /// Whether this verdict is final for a mount.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

/// Verdict plus the source that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Final verdict.
    pub verdict: Verdict,
    /// Source of an `Authenticated` verdict; `None` otherwise.
    pub source: Option<CredentialSource>,
}

impl Resolution {
    const fn authenticated(source: CredentialSource) -> Self {
        Self {
            verdict: Verdict::Authenticated,
            source: Some(source),
        }
    }

    const fn unauthenticated() -> Self {
        Self {
            verdict: Verdict::Unauthenticated,
            source: None,
        }
    }
}

/// Anything that can produce a session verdict.
#[async_trait(?Send)]
pub trait SessionCheck {
    /// Resolve the current visitor's authentication verdict.
    async fn resolve(&self) -> Verdict;
}

/// Combines the credential store with the remote session check.
#[derive(Clone)]
pub struct SessionResolver {
    credentials: CredentialStore,
    provider: Rc<dyn IdentityProvider>,
    clock: Rc<dyn Clock>,
    config: Rc<GateConfig>,
}

impl SessionResolver {
    /// Build a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        credentials: CredentialStore,
        provider: Rc<dyn IdentityProvider>,
        clock: Rc<dyn Clock>,
        config: Rc<GateConfig>,
    ) -> Self {
        Self {
            credentials,
            provider,
            clock,
            config,
        }
    }

    /// Resolve and report which source produced the verdict.
    pub async fn resolve_detailed(&self) -> Resolution {
        if let Some(kind) = self.fresh_local_kind() {
            let resolution = Resolution::authenticated(kind.into());
            debug!(source = kind.as_str(), "session resolved from local record");
            return resolution;
        }

        match self.provider.current_session().await {
            Ok(Some(_)) => {
                debug!(source = "live", "session resolved from identity provider");
                Resolution::authenticated(CredentialSource::Live)
            }
            Ok(None) => {
                debug!("no local record and no remote session");
                Resolution::unauthenticated()
            }
            Err(err) => {
                warn!(error = %err, "remote session check failed; treating as unauthenticated");
                Resolution::unauthenticated()
            }
        }
    }

    /// Synchronous part of resolution: the first fresh local record, purging
    /// stale ones on the way.
    fn fresh_local_kind(&self) -> Option<CredentialKind> {
        let now = self.clock.now_ms();
        for kind in CredentialKind::PRIORITY {
            let Some(record) = self.credentials.read(kind) else {
                continue;
            };
            if record.is_fresh(now, kind.expiry_window(&self.config)) {
                return Some(kind);
            }
            debug!(
                kind = kind.as_str(),
                age_ms = record.age_ms(now),
                "purging expired credential record"
            );
            self.credentials.clear(kind);
        }
        None
    }
}

#[async_trait(?Send)]
impl SessionCheck for SessionResolver {
    async fn resolve(&self) -> Verdict {
        self.resolve_detailed().await.verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialRecord;
    use crate::error::{GateResult, IdentityError};
    use crate::identity::{AuthHandler, Session, Subscription};
    use crate::store::MemoryStorage;
    use std::cell::Cell;

    const NOW: i64 = 1_760_000_000_000;
    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 24 * HOUR_MS;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[derive(Default)]
    struct StubProvider {
        session: bool,
        unavailable: bool,
        calls: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl IdentityProvider for StubProvider {
        async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
            self.calls.set(self.calls.get() + 1);
            if self.unavailable {
                return Err(IdentityError::Unavailable {
                    detail: "offline".to_string(),
                });
            }
            Ok(self.session.then(Session::opaque))
        }

        async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            Ok(())
        }

        fn on_auth_state_change(&self, _: AuthHandler) -> Subscription {
            Subscription::detached()
        }
    }

    struct Fixture {
        storage: Rc<MemoryStorage>,
        provider: Rc<StubProvider>,
        credentials: CredentialStore,
        resolver: SessionResolver,
    }

    fn fixture(provider: StubProvider) -> Fixture {
        let config = Rc::new(GateConfig::default());
        let storage = Rc::new(MemoryStorage::new());
        let provider = Rc::new(provider);
        let credentials = CredentialStore::new(storage.clone(), config.clone());
        let resolver = SessionResolver::new(
            credentials.clone(),
            provider.clone(),
            Rc::new(FixedClock(NOW)),
            config,
        );
        Fixture {
            storage,
            provider,
            credentials,
            resolver,
        }
    }

    #[tokio::test]
    async fn fresh_remembered_record_skips_remote_check() -> GateResult<()> {
        let fx = fixture(StubProvider::default());
        fx.credentials.write(
            CredentialKind::Remembered,
            &CredentialRecord::new(NOW - 29 * DAY_MS, "a"),
        )?;

        let resolution = fx.resolver.resolve_detailed().await;

        assert_eq!(resolution.verdict, Verdict::Authenticated);
        assert_eq!(resolution.source, Some(CredentialSource::Remembered));
        assert_eq!(fx.provider.calls.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn remembered_takes_precedence_over_standard() -> GateResult<()> {
        let fx = fixture(StubProvider::default());
        fx.credentials.write(
            CredentialKind::Remembered,
            &CredentialRecord::new(NOW - DAY_MS, "a"),
        )?;
        fx.credentials.write(
            CredentialKind::Standard,
            &CredentialRecord::new(NOW - HOUR_MS, "a"),
        )?;

        let resolution = fx.resolver.resolve_detailed().await;
        assert_eq!(resolution.source, Some(CredentialSource::Remembered));
        Ok(())
    }

    #[tokio::test]
    async fn expired_remembered_falls_through_to_standard() -> GateResult<()> {
        let fx = fixture(StubProvider::default());
        fx.credentials.write(
            CredentialKind::Remembered,
            &CredentialRecord::new(NOW - 30 * DAY_MS, "a"),
        )?;
        fx.credentials.write(
            CredentialKind::Standard,
            &CredentialRecord::new(NOW - 2 * HOUR_MS, "a"),
        )?;

        let resolution = fx.resolver.resolve_detailed().await;

        assert_eq!(resolution.source, Some(CredentialSource::Standard));
        assert!(!fx.storage.contains("adminAuthRemembered"));
        assert!(fx.storage.contains("adminAuth"));
        assert_eq!(fx.provider.calls.get(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn future_dated_record_is_purged_not_trusted() -> GateResult<()> {
        let fx = fixture(StubProvider::default());
        fx.credentials.write(
            CredentialKind::Standard,
            &CredentialRecord::new(NOW + DAY_MS, "a"),
        )?;

        assert_eq!(fx.resolver.resolve().await, Verdict::Unauthenticated);
        assert!(!fx.storage.contains("adminAuth"));
        assert_eq!(fx.provider.calls.get(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn live_session_authenticates_after_one_remote_call() {
        let fx = fixture(StubProvider {
            session: true,
            ..StubProvider::default()
        });

        let resolution = fx.resolver.resolve_detailed().await;

        assert_eq!(resolution.verdict, Verdict::Authenticated);
        assert_eq!(resolution.source, Some(CredentialSource::Live));
        assert_eq!(fx.provider.calls.get(), 1);
    }

    #[tokio::test]
    async fn remote_failure_resolves_unauthenticated() {
        let fx = fixture(StubProvider {
            unavailable: true,
            ..StubProvider::default()
        });

        assert_eq!(fx.resolver.resolve().await, Verdict::Unauthenticated);
        assert_eq!(fx.provider.calls.get(), 1);
    }

    #[test]
    fn verdict_settlement() {
        assert!(!Verdict::Pending.is_settled());
        assert!(Verdict::Authenticated.is_settled());
        assert!(Verdict::Unauthenticated.is_settled());
        assert_eq!(Verdict::default(), Verdict::Pending);
    }
}
