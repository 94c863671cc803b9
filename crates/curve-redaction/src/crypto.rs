use crate::error::PiiError;
use crate::key_provider::KeyProvider;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::engine::{general_purpose::STANDARD, Engine};
use rand::Rng;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 12;

fn build_cipher(key_bytes: &[u8]) -> Result<Aes256Gcm, PiiError> {
    if key_bytes.len() > KEY_LEN {
        return Err(PiiError::InvalidKey(format!(
            "key must be at most {KEY_LEN} bytes, got {}",
            key_bytes.len()
        )));
    }
    let mut padded = [0u8; KEY_LEN];
    padded[..key_bytes.len()].copy_from_slice(key_bytes);
    let key = aes_gcm::Key::<Aes256Gcm>::from_slice(&padded);
    Ok(Aes256Gcm::new(key))
}

fn random_iv() -> [u8; IV_LEN] {
    rand::thread_rng().gen()
}

/// Direct (single master-key) field encryption: `Base64(IV ‖ ciphertext‖tag)`.
pub struct MasterKeyCrypto {
    cipher: Aes256Gcm,
}

impl MasterKeyCrypto {
    /// `key_base64` is zero-padded to 32 bytes if shorter; rejected if longer.
    pub fn new(key_base64: &str) -> Result<Self, PiiError> {
        let key_bytes = STANDARD
            .decode(key_base64)
            .map_err(|e| PiiError::InvalidKey(format!("invalid base64: {e}")))?;
        Ok(Self {
            cipher: build_cipher(&key_bytes)?,
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, PiiError> {
        let iv = random_iv();
        let nonce = Nonce::from_slice(&iv);
        let ciphertext = self
            .cipher
            .encrypt(nonce, Payload::from(plaintext.as_bytes()))
            .map_err(|e| PiiError::EncryptionFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, PiiError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PiiError::DecryptionFailed(format!("invalid base64: {e}")))?;
        if bytes.len() < IV_LEN {
            return Err(PiiError::DecryptionFailed("payload too short".to_string()));
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(iv), Payload::from(ciphertext))
            .map_err(|e| PiiError::DecryptionFailed(e.to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|e| PiiError::DecryptionFailed(format!("invalid utf-8: {e}")))
    }
}

/// Envelope encryption: a fresh data key per value, obtained from an
/// external [`KeyProvider`]. Wire format: `Base64(len(encDEK) as u16 BE
/// ‖ encDEK ‖ IV ‖ ciphertext‖tag)`.
pub struct EnvelopeCrypto<'a> {
    provider: &'a dyn KeyProvider,
}

impl<'a> EnvelopeCrypto<'a> {
    pub fn new(provider: &'a dyn KeyProvider) -> Self {
        Self { provider }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, PiiError> {
        let data_key = self.provider.generate_data_key()?;
        let cipher = build_cipher(data_key.plaintext_key())?;
        let iv = random_iv();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), Payload::from(plaintext.as_bytes()))
            .map_err(|e| PiiError::EncryptionFailed(e.to_string()))?;

        let enc_dek = data_key.encrypted_key();
        let enc_dek_len: u16 = enc_dek
            .len()
            .try_into()
            .map_err(|_| PiiError::EncryptionFailed("encrypted DEK too large".to_string()))?;

        let mut out = Vec::with_capacity(2 + enc_dek.len() + IV_LEN + ciphertext.len());
        out.extend_from_slice(&enc_dek_len.to_be_bytes());
        out.extend_from_slice(enc_dek);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, PiiError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PiiError::DecryptionFailed(format!("invalid base64: {e}")))?;
        if bytes.len() < 2 {
            return Err(PiiError::DecryptionFailed("payload too short".to_string()));
        }
        let enc_dek_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        if bytes.len() < 2 + enc_dek_len + IV_LEN {
            return Err(PiiError::DecryptionFailed("payload too short".to_string()));
        }
        let enc_dek = &bytes[2..2 + enc_dek_len];
        let rest = &bytes[2 + enc_dek_len..];
        let (iv, ciphertext) = rest.split_at(IV_LEN);

        let plaintext_key = self.provider.decrypt_data_key(enc_dek)?;
        let cipher = build_cipher(&plaintext_key)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), Payload::from(ciphertext))
            .map_err(|e| PiiError::DecryptionFailed(e.to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|e| PiiError::DecryptionFailed(format!("invalid utf-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_provider::tests::StaticKeyProvider;

    fn random_key_b64() -> String {
        let key_bytes: [u8; KEY_LEN] = rand::thread_rng().gen();
        STANDARD.encode(key_bytes)
    }

    #[test]
    fn master_key_roundtrip() {
        let crypto = MasterKeyCrypto::new(&random_key_b64()).unwrap();
        let encrypted = crypto.encrypt("jane.doe@example.com").unwrap();
        assert_eq!(crypto.decrypt(&encrypted).unwrap(), "jane.doe@example.com");
    }

    #[test]
    fn master_key_same_plaintext_differs_each_time() {
        let crypto = MasterKeyCrypto::new(&random_key_b64()).unwrap();
        let a = crypto.encrypt("same").unwrap();
        let b = crypto.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_key_is_zero_padded() {
        let short = STANDARD.encode(b"short-key");
        assert!(MasterKeyCrypto::new(&short).is_ok());
    }

    #[test]
    fn long_key_is_rejected() {
        let long = STANDARD.encode([0u8; 64]);
        assert!(MasterKeyCrypto::new(&long).is_err());
    }

    #[test]
    fn corrupted_ciphertext_fails_to_decrypt() {
        let crypto = MasterKeyCrypto::new(&random_key_b64()).unwrap();
        let encrypted = crypto.encrypt("token").unwrap();
        let mut bytes = STANDARD.decode(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let corrupted = STANDARD.encode(bytes);
        assert!(crypto.decrypt(&corrupted).is_err());
    }

    #[test]
    fn envelope_encryption_roundtrip() {
        let provider = StaticKeyProvider::new();
        let crypto = EnvelopeCrypto::new(&provider);
        let encrypted = crypto.encrypt("secret value").unwrap();
        assert_eq!(crypto.decrypt(&encrypted).unwrap(), "secret value");
    }
}
