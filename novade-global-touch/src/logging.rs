//! Logging setup built on the `tracing` ecosystem.
//!
//! The library itself only emits `tracing` events; the binaries pick one of the
//! two initializers below. `RUST_LOG` always takes precedence over the configured
//! level.

use crate::config::LoggingConfig;
use crate::error::{GlobalTouchError, Result};
use std::io::stdout;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initializes a minimal logging setup, directing messages to `stderr`.
///
/// Used by the client CLI, whose stdout carries event output, and as a fallback
/// before the configuration is loaded. Errors (e.g. a global subscriber is
/// already set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn level_filter(level: &str) -> Result<String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE.to_string()),
        "debug" => Ok(Level::DEBUG.to_string()),
        "info" => Ok(Level::INFO.to_string()),
        "warn" => Ok(Level::WARN.to_string()),
        "error" => Ok(Level::ERROR.to_string()),
        invalid => Err(GlobalTouchError::Logging(format!(
            "Invalid log level in config: {}",
            invalid
        ))),
    }
}

/// Installs the global subscriber described by `config`: a text or JSON `fmt`
/// layer on stdout behind an `EnvFilter`.
///
/// # Errors
///
/// [`GlobalTouchError::Logging`] for an unknown level or if a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = level_filter(&config.level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = match config.format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false)
            .with_filter(filter)
            .boxed(),
        _ => fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .try_init()
        .map_err(|e| {
            GlobalTouchError::Logging(format!("Failed to set global default subscriber: {}", e))
        })?;

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
