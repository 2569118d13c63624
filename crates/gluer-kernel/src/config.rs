//! Engine configuration.
//!
//! Resolved once when a [`crate::Gluer`] is built and read-only afterwards.
//! Nothing here consults environment variables.
//!
//! ```toml
//! mode = "reporting"
//! argument_failures = "collect_all"
//! ```

use crate::validate::FailureStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// How glue failures propagate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Hardened deployment: no checking, identity gluing.
    Off,
    /// Failures are returned as errors.
    #[default]
    Throwing,
    /// Failures go to the reporter and execution continues.
    Reporting,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Off => write!(f, "off"),
            Mode::Throwing => write!(f, "throwing"),
            Mode::Reporting => write!(f, "reporting"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Mode::Off),
            "throwing" | "throw" => Ok(Mode::Throwing),
            "reporting" | "report" => Ok(Mode::Reporting),
            _ => Err(format!(
                "unknown glue mode: {s} (expected off, throwing, or reporting)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GluerConfig {
    pub mode: Mode,
    pub argument_failures: FailureStrategy,
}

impl GluerConfig {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: "<inline>".to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
