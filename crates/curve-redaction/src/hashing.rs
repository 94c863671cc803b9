use base64::engine::{general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

/// SHA-256 over `salt ‖ value`, Base64-encoded.
pub struct Hasher {
    salt: String,
}

impl Hasher {
    /// An unset/empty salt is accepted but logged as a warning: hashes
    /// without a salt are vulnerable to dictionary attacks on low-entropy
    /// values (e.g. phone numbers).
    pub fn new(salt: impl Into<String>) -> Self {
        let salt = salt.into();
        if salt.is_empty() {
            tracing::warn!("pii hashing salt is empty; hashed values are not salted");
        }
        Self { salt }
    }

    pub fn hash(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(value.as_bytes());
        STANDARD.encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_and_salt_hash_identically() {
        let h = Hasher::new("pepper");
        assert_eq!(h.hash("alice@example.com"), h.hash("alice@example.com"));
    }

    #[test]
    fn different_salt_changes_output() {
        let a = Hasher::new("pepper-a");
        let b = Hasher::new("pepper-b");
        assert_ne!(a.hash("alice@example.com"), b.hash("alice@example.com"));
    }

    #[test]
    fn empty_salt_still_hashes() {
        let h = Hasher::new("");
        assert!(!h.hash("alice@example.com").is_empty());
    }
}
