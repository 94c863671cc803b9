use crate::error::PiiError;
use curve_model::DataKey;

/// External collaborator for envelope encryption: mints a fresh data key
/// per value, and can reverse the wrapping it performed (e.g. backed by
/// AWS KMS, Vault transit, or a local test double).
pub trait KeyProvider: Send + Sync {
    fn generate_data_key(&self) -> Result<DataKey, PiiError>;
    fn decrypt_data_key(&self, encrypted_key: &[u8]) -> Result<Vec<u8>, PiiError>;
}
