//! Field-level PII redaction, applied by `curve-serde` at serialization
//! time: masking, AES-256-GCM encryption (direct or envelope), and
//! salted SHA-256 hashing.

pub mod annotation;
pub mod crypto;
pub mod error;
pub mod hashing;
pub mod key_provider;
pub mod masking;

pub use annotation::{FieldAnnotation, Level, PiiType, Strategy};
pub use error::PiiError;
pub use key_provider::KeyProvider;

use crypto::{EnvelopeCrypto, MasterKeyCrypto};
use hashing::Hasher;

/// The layer that turns a raw field value plus its [`FieldAnnotation`]
/// into its redacted wire form. Built once from configuration and
/// shared across serialization calls; never mutates its inputs.
pub struct RedactionEngine {
    master_key: Option<MasterKeyCrypto>,
    key_provider: Option<Box<dyn KeyProvider>>,
    hasher: Hasher,
}

impl RedactionEngine {
    pub fn builder() -> RedactionEngineBuilder {
        RedactionEngineBuilder::default()
    }

    /// Apply `annotation`'s strategy to `value`, returning the value to
    /// write in its place. `Ok` always returns a `String`; masking and
    /// hashing never fail, `ENCRYPT` fails when no key is configured.
    pub fn redact(&self, value: &str, annotation: &FieldAnnotation) -> Result<String, PiiError> {
        match annotation.strategy {
            Strategy::Mask => Ok(masking::mask(value, annotation.pii_type, annotation.level)),
            Strategy::Hash => Ok(self.hasher.hash(value)),
            Strategy::Encrypt => self.encrypt(value),
        }
    }

    fn encrypt(&self, value: &str) -> Result<String, PiiError> {
        if let Some(provider) = &self.key_provider {
            return EnvelopeCrypto::new(provider.as_ref()).encrypt(value);
        }
        match &self.master_key {
            Some(crypto) => crypto.encrypt(value),
            None => Err(PiiError::MissingEncryptionKey),
        }
    }
}

#[derive(Default)]
pub struct RedactionEngineBuilder {
    master_key_base64: Option<String>,
    key_provider: Option<Box<dyn KeyProvider>>,
    hash_salt: Option<String>,
}

impl RedactionEngineBuilder {
    /// Configure direct (single master-key) encryption. Ignored if
    /// [`RedactionEngineBuilder::key_provider`] is also set — envelope
    /// encryption takes precedence.
    pub fn master_key(mut self, key_base64: impl Into<String>) -> Self {
        self.master_key_base64 = Some(key_base64.into());
        self
    }

    /// Configure envelope encryption via an external key provider.
    pub fn key_provider(mut self, provider: Box<dyn KeyProvider>) -> Self {
        self.key_provider = Some(provider);
        self
    }

    pub fn hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.hash_salt = Some(salt.into());
        self
    }

    pub fn build(self) -> Result<RedactionEngine, PiiError> {
        let master_key = self
            .master_key_base64
            .as_deref()
            .map(MasterKeyCrypto::new)
            .transpose()?;
        Ok(RedactionEngine {
            master_key,
            key_provider: self.key_provider,
            hasher: Hasher::new(self.hash_salt.unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_never_fails() {
        let engine = RedactionEngine::builder().build().unwrap();
        let annotation = FieldAnnotation::new(PiiType::Email, Strategy::Mask);
        assert_eq!(
            engine.redact("jsmith@example.com", &annotation).unwrap(),
            "js****@ex*****.com"
        );
    }

    #[test]
    fn encrypt_without_key_fails_with_clear_error() {
        let engine = RedactionEngine::builder().build().unwrap();
        let annotation = FieldAnnotation::new(PiiType::Email, Strategy::Encrypt);
        let err = engine.redact("jsmith@example.com", &annotation).unwrap_err();
        assert!(matches!(err, PiiError::MissingEncryptionKey));
    }

    #[test]
    fn encrypt_with_master_key_round_trips_via_direct_api() {
        use base64::engine::{general_purpose::STANDARD, Engine};
        let key = STANDARD.encode([7u8; 32]);
        let engine = RedactionEngine::builder().master_key(key.clone()).build().unwrap();
        let annotation = FieldAnnotation::new(PiiType::Email, Strategy::Encrypt);
        let redacted = engine.redact("jsmith@example.com", &annotation).unwrap();

        let crypto = crypto::MasterKeyCrypto::new(&key).unwrap();
        assert_eq!(crypto.decrypt(&redacted).unwrap(), "jsmith@example.com");
    }

    #[test]
    fn hash_is_deterministic_for_same_salt() {
        let engine = RedactionEngine::builder().hash_salt("pepper").build().unwrap();
        let annotation = FieldAnnotation::new(PiiType::Email, Strategy::Hash);
        let a = engine.redact("jsmith@example.com", &annotation).unwrap();
        let b = engine.redact("jsmith@example.com", &annotation).unwrap();
        assert_eq!(a, b);
    }
}
