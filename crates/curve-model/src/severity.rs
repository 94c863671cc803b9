use serde::{Deserialize, Serialize};

/// Event severity, carried on the wire as an uppercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}
