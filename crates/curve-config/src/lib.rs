//! Configuration surface for the event publishing runtime (§6): kafka,
//! retry, pii, outbox, id generator and wire-format field groups, loaded
//! from defaults + an optional file + environment variables, the way
//! `backend/common/config-core::BaseConfig::load` layers its sources.

pub mod error;
pub mod id_generator;
pub mod kafka;
pub mod outbox;
pub mod pii;
pub mod retry;
pub mod serde_config;

pub use error::ConfigError;
pub use id_generator::IdGeneratorConfig;
pub use kafka::{KafkaBackupConfig, KafkaConfig};
pub use outbox::{OutboxConfig, SchemaInitMode};
pub use pii::{PiiConfig, PiiCryptoConfig};
pub use retry::RetryConfig;
pub use serde_config::{SerdeConfig, SerdeType};

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// The full configuration tree (§6). `enabled` is the top-level kill
/// switch; when `false` the library does nothing (no publisher, no
/// poller), matching the conceptual surface's bare `enabled` key.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurveConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    #[validate(nested)]
    pub kafka: KafkaConfig,

    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub pii: PiiConfig,

    #[serde(default)]
    #[validate(nested)]
    pub outbox: OutboxConfig,

    #[serde(default)]
    #[validate(nested)]
    pub id_generator: IdGeneratorConfig,

    #[serde(default)]
    pub serde: SerdeConfig,
}

fn default_enabled() -> bool {
    true
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            kafka: KafkaConfig::default(),
            retry: RetryConfig::default(),
            pii: PiiConfig::default(),
            outbox: OutboxConfig::default(),
            id_generator: IdGeneratorConfig::default(),
            serde: SerdeConfig::default(),
        }
    }
}

impl CurveConfig {
    /// Loads defaults, then an optional file (if it exists), then
    /// `CURVE_`-prefixed environment variables, then applies the two
    /// dedicated PII environment variables, then validates. Mirrors
    /// `BaseConfig::load`'s layering without the Nova-specific base
    /// sections (HTTP, gRPC, database) this library doesn't own.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CURVE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut parsed: CurveConfig = settings.try_deserialize()?;

        parsed.pii.apply_env_overrides();
        parsed.validate()?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CurveConfig::default().validate().is_ok());
    }

    #[test]
    fn load_with_no_file_falls_back_to_defaults() {
        let config = CurveConfig::load(None).unwrap();
        assert_eq!(config.kafka.topic, "curve-events");
        assert_eq!(config.outbox.batch_size, 100);
    }

    #[test]
    fn invalid_nested_field_fails_top_level_validation() {
        let mut config = CurveConfig::default();
        config.outbox.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
