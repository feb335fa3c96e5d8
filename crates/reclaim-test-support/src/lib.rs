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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (time constants, storage seeding), clock.rs (manual
//! clock), identity.rs (scripted identity provider), storage.rs (failing
//! storage backend).

pub mod clock;
pub mod fixtures;
pub mod identity;
pub mod storage;
