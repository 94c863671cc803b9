use serde::{Deserialize, Serialize};

/// Redaction settings (§6 `pii.*`). `crypto.default_key` and `crypto.salt`
/// are overridden by the `PII_ENCRYPTION_KEY`/`PII_HASH_SALT` environment
/// variables at load time if set, the same way `DbConfig::from_env` lets an
/// environment variable win over a file value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub crypto: PiiCryptoConfig,
}

fn default_enabled() -> bool {
    true
}

impl Default for PiiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            crypto: PiiCryptoConfig::default(),
        }
    }
}

impl PiiConfig {
    /// Applies `PII_ENCRYPTION_KEY`/`PII_HASH_SALT` on top of whatever was
    /// loaded from file/defaults, in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("PII_ENCRYPTION_KEY") {
            self.crypto.default_key = Some(key);
        }
        if let Ok(salt) = std::env::var("PII_HASH_SALT") {
            self.crypto.salt = Some(salt);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiCryptoConfig {
    /// Base64-encoded 256-bit master key for direct `ENCRYPT` redaction.
    /// Absent means encryption is unavailable and `ENCRYPT`-strategy fields
    /// fail at redaction time (`PiiError::MissingEncryptionKey`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}
