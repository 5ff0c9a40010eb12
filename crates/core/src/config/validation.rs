//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `user_agent` is empty
    /// - the viewport is outside 320x240 ..= 7680x4320
    /// - `settle_ms` exceeds one minute
    /// - `step_delay_ms` is outside 50ms ..= 10s
    /// - `launch_timeout_ms` is outside 1s ..= 5 minutes
    /// - `top_limit` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !(320..=7680).contains(&self.viewport_width) {
            return Err(invalid("viewport_width", "must be between 320 and 7680"));
        }
        if !(240..=4320).contains(&self.viewport_height) {
            return Err(invalid("viewport_height", "must be between 240 and 4320"));
        }

        if self.settle_ms > 60_000 {
            return Err(invalid("settle_ms", "must not exceed 1 minute (60000ms)"));
        }

        if self.step_delay_ms < 50 {
            return Err(invalid("step_delay_ms", "must be at least 50ms"));
        }
        if self.step_delay_ms > 10_000 {
            return Err(invalid("step_delay_ms", "must not exceed 10000ms"));
        }

        if self.launch_timeout_ms < 1_000 {
            return Err(invalid("launch_timeout_ms", "must be at least 1000ms"));
        }
        if self.launch_timeout_ms > 300_000 {
            return Err(invalid("launch_timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.top_limit == 0 {
            return Err(invalid("top_limit", "must be greater than 0"));
        }

        if !self.headless {
            tracing::warn!("headless is disabled; a visible browser window will be opened for each run");
        }

        Ok(())
    }
}
