//! Subscriber construction and global installation.
//!
//! # Design
//! - One entry point builds the fmt subscriber (JSON or pretty) so native and
//!   browser builds format events identically.
//! - The writer is pluggable; the browser build routes lines to the console
//!   and must disable timestamps because `SystemTime` is unavailable there.

use anyhow::{Result, anyhow};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, fmt::MakeWriter};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level or filter directive (e.g., `info`, `reclaim_gate=debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Emit ANSI colour codes.
    pub ansi: bool,
    /// Prefix each line with a timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            ansi: true,
            timestamps: true,
        }
    }
}

impl<'a> LoggingConfig<'a> {
    /// Settings for a browser console: no colours, no clock.
    #[must_use]
    pub const fn browser(level: &'a str) -> Self {
        Self {
            level,
            format: LogFormat::infer(),
            ansi: false,
            timestamps: false,
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Map a configured name to a format; unknown names fall back to
    /// [`LogFormat::infer`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

/// Build a subscriber writing through `writer` without installing it.
#[must_use]
pub fn build_subscriber<W>(
    config: &LoggingConfig<'_>,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = fmt::fmt()
        .with_env_filter(build_env_filter(config.level))
        .with_writer(writer)
        .with_ansi(config.ansi)
        .with_target(false)
        .with_thread_ids(false);

    match (config.format, config.timestamps) {
        (LogFormat::Json, true) => Box::new(builder.json().finish()),
        (LogFormat::Json, false) => Box::new(builder.json().without_time().finish()),
        (LogFormat::Pretty, true) => Box::new(builder.pretty().finish()),
        (LogFormat::Pretty, false) => Box::new(builder.pretty().without_time().finish()),
    }
}

/// Configure and install the global tracing subscriber on stdout.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    init_logging_with_writer(config, std::io::stdout)
}

/// Install the global tracing subscriber writing through `writer`.
///
/// # Errors
///
/// Returns an error if another subscriber has already been set globally.
pub fn init_logging_with_writer<W>(config: &LoggingConfig<'_>, writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(build_subscriber(config, writer))
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
