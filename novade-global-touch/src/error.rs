//! Error types for the global touch extension.
//!
//! [`GlobalTouchError`] is the error surfaced by every lifecycle, registry and
//! control operation. The first three variants map one-to-one onto the failure
//! modes a compositor has to handle at runtime; the rest cover the ambient
//! plumbing (configuration, logging, I/O, input backend).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobalTouchError {
    /// A capability (or touch switch) already exists for this compositor.
    #[error("{0} already exists for this compositor")]
    AlreadyExists(&'static str),

    /// The capability was never created, or the object is no longer bound to it.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Allocation of a capability record or subscription failed.
    #[error("out of memory while allocating {0}")]
    OutOfMemory(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),

    #[error("Input backend error: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating [`crate::config::GlobalTouchConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

pub type Result<T, E = GlobalTouchError> = std::result::Result<T, E>;
