//! Analysis configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default length of the pre- and post-dose windows.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Longest window accepted; roughly one quarterly dosing interval.
pub const MAX_WINDOW_DAYS: u32 = 90;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {name} window: {days} days (allowed 1..={max})")]
    InvalidWindow {
        name: &'static str,
        days: u32,
        max: u32,
    },
}

/// Window lengths used for the pre/post comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pre_window_days: u32,
    pub post_window_days: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pre_window_days: DEFAULT_WINDOW_DAYS,
            post_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl AnalysisConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_pre_window_days(mut self, days: u32) -> Self {
        self.pre_window_days = days;
        self
    }

    pub fn with_post_window_days(mut self, days: u32) -> Self {
        self.post_window_days = days;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, days) in [("pre", self.pre_window_days), ("post", self.post_window_days)] {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return Err(ConfigError::InvalidWindow {
                    name,
                    days,
                    max: MAX_WINDOW_DAYS,
                });
            }
        }
        Ok(())
    }
}
