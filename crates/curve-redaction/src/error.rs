use thiserror::Error;

/// Errors raised while redacting a field at serialization time.
#[derive(Debug, Error)]
pub enum PiiError {
    /// `ENCRYPT` was requested but no encryption key is configured.
    #[error(
        "field-level encryption requested but no key is configured; \
         set a 32-byte base64 key via curve-config's pii.encryption_key"
    )]
    MissingEncryptionKey,

    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("key provider failed: {0}")]
    KeyProvider(String),
}
