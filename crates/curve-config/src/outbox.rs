use serde::{Deserialize, Serialize};
use validator::Validate;

/// Transactional outbox, poller, and cleanup settings (§6 `outbox.*`).
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OutboxConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[validate(range(min = 1))]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    #[serde(default = "default_max_retries")]
    pub max_retries: i32,

    #[validate(range(min = 1))]
    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,

    #[serde(default = "default_cleanup_enabled")]
    pub cleanup_enabled: bool,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    #[serde(default = "default_cleanup_cron")]
    pub cleanup_cron: String,

    #[serde(default)]
    pub initialize_schema: SchemaInitMode,

    #[serde(default = "default_publisher_enabled")]
    pub publisher_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_batch_size() -> i64 {
    100
}

fn default_max_retries() -> i32 {
    5
}

fn default_send_timeout_seconds() -> u64 {
    10
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

fn default_cleanup_cron() -> String {
    "0 0 2 * * *".to_string()
}

fn default_publisher_enabled() -> bool {
    true
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            send_timeout_seconds: default_send_timeout_seconds(),
            cleanup_enabled: default_cleanup_enabled(),
            retention_days: default_retention_days(),
            cleanup_cron: default_cleanup_cron(),
            initialize_schema: SchemaInitMode::default(),
            publisher_enabled: default_publisher_enabled(),
        }
    }
}

/// `EMBEDDED` degrades to `NEVER` against a real Postgres `DATABASE_URL`
/// and to `ALWAYS` against the in-memory test repository — this crate
/// ships no embedded SQL engine to initialize against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaInitMode {
    #[default]
    Embedded,
    Always,
    Never,
}
