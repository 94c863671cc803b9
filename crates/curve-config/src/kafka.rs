use serde::{Deserialize, Serialize};
use validator::Validate;

/// Broker, retry, DLQ and backup settings (§6 `kafka.*`).
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConfig {
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_dlq_topic")]
    pub dlq_topic: String,

    /// Publish from the caller's thread (`false`) or hand the send/retry/DLQ
    /// chain to the graceful executor (`true`).
    #[serde(default)]
    pub async_mode: bool,

    #[validate(range(min = 1))]
    #[serde(default = "default_async_timeout_ms")]
    pub async_timeout_ms: u64,

    #[validate(range(min = 1))]
    #[serde(default = "default_sync_timeout_seconds")]
    pub sync_timeout_seconds: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[validate(range(min = 1))]
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[validate(range(min = 1))]
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_dlq_executor_threads")]
    pub dlq_executor_threads: u32,

    #[validate(range(min = 1))]
    #[serde(default = "default_dlq_executor_shutdown_timeout_seconds")]
    pub dlq_executor_shutdown_timeout_seconds: u64,

    #[serde(default)]
    pub backup: KafkaBackupConfig,
}

fn default_topic() -> String {
    "curve-events".to_string()
}

fn default_dlq_topic() -> String {
    "curve-events-dlq".to_string()
}

fn default_async_timeout_ms() -> u64 {
    5_000
}

fn default_sync_timeout_seconds() -> u64 {
    5
}

fn default_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_dlq_executor_threads() -> u32 {
    2
}

fn default_dlq_executor_shutdown_timeout_seconds() -> u64 {
    30
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            dlq_topic: default_dlq_topic(),
            async_mode: false,
            async_timeout_ms: default_async_timeout_ms(),
            sync_timeout_seconds: default_sync_timeout_seconds(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            dlq_executor_threads: default_dlq_executor_threads(),
            dlq_executor_shutdown_timeout_seconds: default_dlq_executor_shutdown_timeout_seconds(),
            backup: KafkaBackupConfig::default(),
        }
    }
}

/// File-backup fallback when both the main topic send and the DLQ send fail.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaBackupConfig {
    #[serde(default = "default_local_enabled")]
    pub local_enabled: bool,

    /// S3 backup is named in the conceptual surface but not implemented by
    /// this crate; kept so configuration files from the wider system
    /// validate without alteration. Always treated as disabled.
    #[serde(default)]
    pub s3_enabled: bool,
}

fn default_local_enabled() -> bool {
    true
}

impl Default for KafkaBackupConfig {
    fn default() -> Self {
        Self {
            local_enabled: default_local_enabled(),
            s3_enabled: false,
        }
    }
}
