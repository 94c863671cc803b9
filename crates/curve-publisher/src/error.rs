use curve_serde::SerdeError;
use thiserror::Error;

/// Only the two failure kinds `publish` ever surfaces to the caller
/// (§7): everything broker-side is swallowed by the retry → DLQ → file
/// backup chain.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("event could not be serialized: {0}")]
    Serialization(#[from] SerdeError),

    #[error("publisher is shutting down, new publish calls are rejected")]
    ShuttingDown,
}
