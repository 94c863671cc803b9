use serde::{Deserialize, Serialize};
use validator::Validate;

/// Backoff schedule for broker dispatch retries (§6 `retry.*`), consumed by
/// `curve_publisher::RetryConfig`.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[validate(range(min = 1))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[validate(range(min = 1))]
    #[serde(default = "default_initial_interval")]
    pub initial_interval_ms: u64,

    #[validate(range(min = 1.0))]
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[validate(range(min = 1))]
    #[serde(default = "default_max_interval")]
    pub max_interval_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_interval() -> u64 {
    200
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_interval() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_attempts: default_max_attempts(),
            initial_interval_ms: default_initial_interval(),
            multiplier: default_multiplier(),
            max_interval_ms: default_max_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sub_unity_multiplier() {
        let mut config = RetryConfig::default();
        config.multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_max_attempts() {
        let mut config = RetryConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
