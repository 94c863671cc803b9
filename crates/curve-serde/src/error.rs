use curve_redaction::PiiError;
use thiserror::Error;

/// Corresponds to the `EventSerialization` and `PiiCrypto` error kinds:
/// raised while turning an envelope into wire bytes, never retried.
#[derive(Debug, Error)]
pub enum SerdeError {
    #[error("envelope could not be serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pii redaction failed: {0}")]
    Pii(#[from] PiiError),

    #[error("field '{0}' is annotated for redaction but is not a string")]
    UnsupportedFieldType(String),
}
