use serde::{Deserialize, Serialize};
use validator::Validate;

/// Snowflake worker id settings (§6 `idGenerator.*`).
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdGeneratorConfig {
    /// Fixed worker id. Ignored (and derived instead) when `auto_generate`
    /// is `true`.
    #[validate(range(min = 0, max = 1023))]
    #[serde(default)]
    pub worker_id: u16,

    /// Derive the worker id from a stable host identifier instead of using
    /// `worker_id` directly. Advisory: collisions across instances are the
    /// operator's problem, same as the Nova `for_service` pool-sizing note.
    #[serde(default = "default_auto_generate")]
    pub auto_generate: bool,
}

fn default_auto_generate() -> bool {
    true
}

impl Default for IdGeneratorConfig {
    fn default() -> Self {
        Self {
            worker_id: 0,
            auto_generate: default_auto_generate(),
        }
    }
}
