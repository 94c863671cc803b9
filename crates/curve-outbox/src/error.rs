use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("outbox database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("outbox event payload could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("outbox event not found: {0}")]
    NotFound(String),
}
