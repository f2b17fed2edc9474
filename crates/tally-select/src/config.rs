//! Selector configuration
//!
//! Loaded from TOML, then optionally overridden by `TALLY_*` environment
//! variables:
//!
//! ```toml
//! strategy = "max_fee"        # or "greedy"
//! max_search_states = 500000  # omit for an unbounded search
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const ENV_PREFIX: &str = "TALLY_";

/// How a round picks its accepted set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Exhaustive fee-maximizing search
    #[default]
    MaxFee,
    /// Accept anything valid, in proposal order, until nothing more fits
    Greedy,
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxFee => f.write_str("max_fee"),
            Self::Greedy => f.write_str("greedy"),
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max_fee" | "max-fee" | "maxfee" => Ok(Self::MaxFee),
            "greedy" => Ok(Self::Greedy),
            other => Err(ConfigError::invalid(
                "strategy",
                format!("unknown strategy '{other}'"),
            )),
        }
    }
}

/// Selector settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Selection strategy
    pub strategy: SelectionStrategy,
    /// Upper bound on memoized search states per round; `None` is unbounded
    pub max_search_states: Option<usize>,
}

/// Configuration loading and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// OS error message
        message: String,
    },

    /// Config text is not valid TOML for this shape
    #[error("Invalid config: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// A field holds an unacceptable value
    #[error("Field '{field}': {message}")]
    Invalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid field error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl SelectorConfig {
    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `TALLY_STRATEGY` and `TALLY_MAX_SEARCH_STATES` from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `TALLY_*` overrides from an explicit variable list
    ///
    /// `TALLY_MAX_SEARCH_STATES` accepts a count or `unbounded`. Other
    /// `TALLY_*` names are ignored.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "STRATEGY" => self.strategy = value.parse()?,
                "MAX_SEARCH_STATES" => {
                    self.max_search_states = if value.eq_ignore_ascii_case("unbounded") {
                        None
                    } else {
                        Some(value.trim().parse().map_err(|_| {
                            ConfigError::invalid(
                                "max_search_states",
                                format!("'{value}' is not a state count"),
                            )
                        })?)
                    };
                }
                _ => {}
            }
        }
        self.validate()
    }

    /// Check field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_search_states == Some(0) {
            return Err(ConfigError::invalid(
                "max_search_states",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}
