use async_trait::async_trait;
use thiserror::Error;

/// Whether a broker failure is worth retrying. Network hiccups,
/// timeouts, and "not leader for partition" are transient; auth
/// failures and oversized records are not — retrying them just wastes
/// time before the same outcome.
#[derive(Debug, Error, Clone)]
pub enum BrokerError {
    #[error("transient broker error: {0}")]
    Transient(String),

    #[error("permanent broker error: {0}")]
    Permanent(String),
}

impl BrokerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BrokerError::Transient(_))
    }
}

/// The external broker collaborator (§1 "out of scope" — assumed to
/// provide at-least-once delivery when the producer is configured with
/// `acks=all` and idempotence enabled).
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn send(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), BrokerError>;
}
