//! Diagnostic Logging
//!
//! Installs the global `tracing` subscriber. Records go to stderr, because
//! stdout carries the sample stream.

use std::io::IsTerminal;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Errors emitted when configuring the tracing subscriber
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,

    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Default filter directive when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Configure the global tracing subscriber.
///
/// `RUST_LOG` wins over the verbose flag when it is set.
pub fn init_tracing(verbose: bool) -> Result<(), TelemetryError> {
    INITIALISED
        .set(())
        .map_err(|_| TelemetryError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal());

    Registry::default().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}
