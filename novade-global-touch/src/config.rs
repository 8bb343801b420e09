//! Configuration for the global touch extension and its headless host.
//!
//! The configuration is a small TOML document; every section and every field is
//! optional and falls back to the values in [`defaults`]:
//!
//! ```toml
//! [global_touch]
//! enabled = true
//! # max_subscriptions = 64
//!
//! [touch_switch]
//! enabled = false
//!
//! [input]
//! touchscreen_enabled = true
//! seat = "seat0"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use crate::error::{ConfigError, GlobalTouchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod defaults {
    pub fn default_true() -> bool {
        true
    }

    pub fn default_false() -> bool {
        false
    }

    pub fn default_seat() -> String {
        "seat0".to_string()
    }

    pub fn default_log_level() -> String {
        "info".to_string()
    }

    pub fn default_log_format() -> String {
        "text".to_string()
    }
}

/// `[global_touch]`: the broadcast capability itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalTouchSection {
    /// Create the capability at startup.
    #[serde(default = "defaults::default_true")]
    pub enabled: bool,
    /// Upper bound on simultaneous subscriptions. Binds beyond it fail like an
    /// allocation failure. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subscriptions: Option<usize>,
}

impl Default for GlobalTouchSection {
    fn default() -> Self {
        Self { enabled: defaults::default_true(), max_subscriptions: None }
    }
}

/// `[touch_switch]`: the control-only `weston_touch_switch` global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TouchSwitchSection {
    #[serde(default = "defaults::default_false")]
    pub enabled: bool,
}

impl Default for TouchSwitchSection {
    fn default() -> Self {
        Self { enabled: defaults::default_false() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
    /// Initial state of the touchscreen switch.
    #[serde(default = "defaults::default_true")]
    pub touchscreen_enabled: bool,
    /// udev seat the libinput backend assigns itself to.
    #[serde(default = "defaults::default_seat")]
    pub seat: String,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            touchscreen_enabled: defaults::default_true(),
            seat: defaults::default_seat(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of "trace", "debug", "info", "warn", "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// "text" or "json" (case-insensitive).
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            format: defaults::default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalTouchConfig {
    #[serde(default)]
    pub global_touch: GlobalTouchSection,
    #[serde(default)]
    pub touch_switch: TouchSwitchSection,
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GlobalTouchConfig {
    /// Renders the configuration back to TOML, e.g. for `--gen-config`.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            GlobalTouchError::Config(ConfigError::ValidationError(format!(
                "Failed to serialize configuration: {}",
                e
            )))
        })
    }
}

/// Namespace for loading and validating [`GlobalTouchConfig`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates the configuration at `path`.
    ///
    /// A missing or empty file yields the default configuration. Any other read
    /// failure is a [`ConfigError::ReadError`].
    pub fn load_from_path(path: &Path) -> Result<GlobalTouchConfig> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Configuration file not found, using defaults");
                String::new()
            }
            Err(e) => {
                return Err(GlobalTouchError::Config(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }));
            }
        };
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document. Blank input yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<GlobalTouchConfig> {
        let mut config = if content.trim().is_empty() {
            GlobalTouchConfig::default()
        } else {
            toml::from_str::<GlobalTouchConfig>(content)
                .map_err(|e| GlobalTouchError::Config(ConfigError::ParseError(e)))?
        };
        Self::validate(&mut config)?;
        Ok(config)
    }

    /// Normalises log level and format to lowercase and checks value ranges.
    pub fn validate(config: &mut GlobalTouchConfig) -> Result<()> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                config.logging.level = level_lower;
            }
            _ => {
                return Err(GlobalTouchError::Config(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => {
                config.logging.format = format_lower;
            }
            _ => {
                return Err(GlobalTouchError::Config(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))));
            }
        }

        if config.global_touch.max_subscriptions == Some(0) {
            return Err(GlobalTouchError::Config(ConfigError::ValidationError(
                "global_touch.max_subscriptions must be greater than 0".to_string(),
            )));
        }

        if config.input.seat.trim().is_empty() {
            return Err(GlobalTouchError::Config(ConfigError::ValidationError(
                "input.seat must not be empty".to_string(),
            )));
        }

        Ok(())
    }
}
