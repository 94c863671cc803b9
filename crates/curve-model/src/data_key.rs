use crate::error::EnvelopeError;
use std::fmt;

/// An envelope-encryption data key: the plaintext key used to encrypt a
/// field, and that same key encrypted under a master key for storage
/// alongside the ciphertext.
///
/// `Debug`/`Display` both mask the plaintext half — this type routinely
/// ends up in log statements via `?`/`{}` and must never leak key
/// material there.
#[derive(Clone, PartialEq, Eq)]
pub struct DataKey {
    plaintext_key: Vec<u8>,
    encrypted_key: Vec<u8>,
}

impl DataKey {
    pub fn new(plaintext_key: Vec<u8>, encrypted_key: Vec<u8>) -> Result<Self, EnvelopeError> {
        if plaintext_key.is_empty() {
            return Err(EnvelopeError::Blank("dataKey.plaintextKey"));
        }
        if encrypted_key.is_empty() {
            return Err(EnvelopeError::Blank("dataKey.encryptedKey"));
        }
        Ok(Self {
            plaintext_key,
            encrypted_key,
        })
    }

    pub fn plaintext_key(&self) -> &[u8] {
        &self.plaintext_key
    }

    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("plaintext_key", &"***")
            .field("encrypted_key_len", &self.encrypted_key.len())
            .finish()
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey(plaintext=***, encrypted_len={})", self.encrypted_key.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_keys() {
        assert!(DataKey::new(vec![], vec![1]).is_err());
        assert!(DataKey::new(vec![1], vec![]).is_err());
    }

    #[test]
    fn equality_is_by_byte_contents() {
        let a = DataKey::new(vec![1, 2, 3], vec![9, 9]).unwrap();
        let b = DataKey::new(vec![1, 2, 3], vec![9, 9]).unwrap();
        let c = DataKey::new(vec![1, 2, 4], vec![9, 9]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn debug_and_display_mask_plaintext() {
        let key = DataKey::new(vec![1, 2, 3], vec![9, 9]).unwrap();
        assert!(!format!("{key:?}").contains('\u{1}'));
        assert!(format!("{key:?}").contains("***"));
        assert!(format!("{key}").contains("***"));
    }
}
