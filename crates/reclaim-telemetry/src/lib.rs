#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Logging setup shared by the reclaim front-end and its native tooling.
//!
//! The gate crates only emit `tracing` events; this crate decides where they
//! go and in which shape.

pub mod init;

pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_subscriber, init_logging,
    init_logging_with_writer,
};
