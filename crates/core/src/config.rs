// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler configuration
//!
//! Durations are written human-readably in TOML:
//!
//! ```toml
//! debounce = "30s"
//! min_delay = "0s"
//! max_resources = 4096
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Longest debounce window accepted
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tuning for the regeneration scheduler
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit before a regeneration starts
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
    /// Floor for any computed timer delay
    #[serde(with = "humantime_serde")]
    pub min_delay: Duration,
    /// Idle resources beyond this count are evicted, least recently touched first
    pub max_resources: usize,
    /// Buffer size of the scheduler event broadcast
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(30),
            min_delay: Duration::ZERO,
            max_resources: 4096,
            event_capacity: 256,
        }
    }
}

impl SchedulerConfig {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            ..Self::default()
        }
    }

    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn with_max_resources(mut self, max_resources: usize) -> Self {
        self.max_resources = max_resources;
        self
    }

    /// Parse and validate a `[scheduler]` table
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the scheduler misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce.is_zero() {
            return Err(ConfigError::Invalid {
                field: "debounce",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.debounce > MAX_DEBOUNCE {
            return Err(ConfigError::Invalid {
                field: "debounce",
                reason: format!(
                    "must be at most {}",
                    humantime::format_duration(MAX_DEBOUNCE)
                ),
            });
        }
        if self.min_delay > self.debounce {
            return Err(ConfigError::Invalid {
                field: "min_delay",
                reason: "must not exceed debounce".to_string(),
            });
        }
        if self.max_resources == 0 {
            return Err(ConfigError::Invalid {
                field: "max_resources",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "event_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
