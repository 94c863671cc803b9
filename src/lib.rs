//! Root facade: re-exports the workspace's crates and wires
//! [`curve_config::CurveConfig`] into the constructor arguments the
//! individual crates expect. Each crate stays independently usable;
//! this crate only saves callers from repeating the glue.

pub mod telemetry;

pub use curve_clock as clock;
pub use curve_config as config;
pub use curve_executor as executor;
pub use curve_id as id;
pub use curve_metrics as metrics;
pub use curve_model as model;
pub use curve_outbox as outbox;
pub use curve_publisher as publisher;
pub use curve_redaction as redaction;
pub use curve_schema as schema;
pub use curve_serde as serde;

use std::path::PathBuf;
use std::time::Duration;

/// Resolves the effective Snowflake worker id: the configured
/// `worker_id` unless `auto_generate` is set, in which case it's derived
/// from [`curve_id::local_host_identifier`] (§4.1 auto-derived worker
/// id).
pub fn resolve_worker_id(config: &curve_config::IdGeneratorConfig) -> u16 {
    if config.auto_generate {
        curve_id::derive_worker_id(&curve_id::local_host_identifier())
    } else {
        config.worker_id
    }
}

impl From<&curve_config::RetryConfig> for curve_publisher::RetryConfig {
    fn from(config: &curve_config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            multiplier: config.multiplier,
            max_interval: Duration::from_millis(config.max_interval_ms),
        }
    }
}

/// Builds a [`curve_publisher::PublisherConfig`] from the configuration
/// surface plus the two fields it doesn't name: the event type this
/// publisher instance is for, and where to write file backups when
/// `kafka.backup.localEnabled` is set. The conceptual config surface
/// (§6) has no `dlqBackupPath` key, so the caller supplies it directly.
pub fn publisher_config(
    config: &curve_config::CurveConfig,
    event_type: impl Into<String>,
    dlq_backup_path: Option<PathBuf>,
) -> curve_publisher::PublisherConfig {
    let kafka = &config.kafka;
    curve_publisher::PublisherConfig {
        event_type: event_type.into(),
        topic: kafka.topic.clone(),
        dlq_topic: Some(kafka.dlq_topic.clone()),
        dlq_backup_path: if kafka.backup.local_enabled { dlq_backup_path } else { None },
        async_mode: kafka.async_mode,
        sync_timeout: Duration::from_secs(kafka.sync_timeout_seconds),
        async_timeout: Duration::from_millis(kafka.async_timeout_ms),
        retry: config.retry.enabled.then(|| curve_publisher::RetryConfig::from(&config.retry)),
    }
}

/// Builds a [`curve_outbox::PollerConfig`] from `config.outbox`.
pub fn poller_config(config: &curve_config::OutboxConfig) -> curve_outbox::PollerConfig {
    curve_outbox::PollerConfig {
        poll_interval: Duration::from_millis(config.poll_interval_ms),
        batch_size: config.batch_size,
        max_retries: config.max_retries,
        send_timeout: Duration::from_secs(config.send_timeout_seconds),
        dynamic_batch_enabled: true,
        circuit_breaker_enabled: true,
    }
}

/// Builds a [`curve_outbox::CleanupConfig`] from `config.outbox`.
pub fn cleanup_config(config: &curve_config::OutboxConfig) -> curve_outbox::CleanupConfig {
    curve_outbox::CleanupConfig {
        retention: chrono::Duration::days(config.retention_days),
        batch_limit: 1000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_worker_id_uses_configured_value_when_not_auto() {
        let config = curve_config::IdGeneratorConfig {
            worker_id: 42,
            auto_generate: false,
        };
        assert_eq!(resolve_worker_id(&config), 42);
    }

    #[test]
    fn resolve_worker_id_derives_when_auto_generate_is_set() {
        let config = curve_config::IdGeneratorConfig {
            worker_id: 0,
            auto_generate: true,
        };
        assert!(resolve_worker_id(&config) <= curve_id::MAX_WORKER_ID);
    }

    #[test]
    fn publisher_config_omits_backup_path_when_local_backup_disabled() {
        let mut config = curve_config::CurveConfig::default();
        config.kafka.backup.local_enabled = false;
        let built = publisher_config(&config, "order.created", Some(PathBuf::from("/tmp/backup")));
        assert!(built.dlq_backup_path.is_none());
    }

    #[test]
    fn publisher_config_keeps_backup_path_when_local_backup_enabled() {
        let config = curve_config::CurveConfig::default();
        let built = publisher_config(&config, "order.created", Some(PathBuf::from("/tmp/backup")));
        assert!(built.dlq_backup_path.is_some());
    }
}
