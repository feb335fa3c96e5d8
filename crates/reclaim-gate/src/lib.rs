#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Client-side access gate for the Reclaim admin console.
//!
//! The gate decides, on every navigation, whether a visitor may see a
//! protected view, must be sent to the login boundary, or must be sent to the
//! maintenance boundary. It is DOM-free so the whole decision path can be
//! exercised natively; the browser shell only supplies storage, a clock, and
//! an identity provider.
//!
//! Layout: `store` (key/value persistence), `credentials` (credential
//! records), `identity` (provider collaborator and auth events), `resolver`
//! (session verdicts), `maintenance` (site-wide override), `subscriber`
//! (push updates), `guard` (per-mount state machine), `gate` (facade).

pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod maintenance;
pub mod resolver;
pub mod store;
pub mod subscriber;

pub use clock::{Clock, SystemClock};
pub use config::{BypassPolicy, GateConfig, StorageKeys};
pub use credentials::{CredentialKind, CredentialRecord, CredentialSource, CredentialStore};
pub use error::{GateError, GateResult, IdentityError, StorageError};
pub use gate::{AccessGate, SignInRequest};
pub use guard::{Boundary, GuardDecision, GuardKind, GuardReaction, RouteGuard, Ticket};
pub use identity::{AuthEvent, AuthEvents, AuthHandler, IdentityProvider, Session, Subscription};
pub use maintenance::{MaintenanceCheck, MaintenanceGate, MaintenanceState};
pub use resolver::{Resolution, SessionCheck, SessionResolver, Verdict};
pub use store::{KeyValueStore, MemoryStorage};
pub use subscriber::AuthEventSubscriber;
