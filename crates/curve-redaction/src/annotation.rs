use serde::{Deserialize, Serialize};

/// The redaction strategy applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Mask,
    Encrypt,
    Hash,
}

/// The semantic kind of PII a field carries, selecting which masking
/// rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiType {
    Email,
    Phone,
    Name,
    Address,
    Ssn,
    CreditCard,
    IpAddress,
    Custom,
}

/// How aggressively a `MASK` strategy obscures the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Weak,
    Normal,
    Strong,
}

impl Default for Level {
    fn default() -> Self {
        Level::Normal
    }
}

/// Per-field redaction configuration, mirroring the annotation a payload
/// class attaches to one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAnnotation {
    pub pii_type: PiiType,
    pub strategy: Strategy,
    #[serde(default)]
    pub level: Level,
    /// Name of the key to use for `ENCRYPT`, when more than one key is
    /// configured. `None` selects the default key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_key: Option<String>,
    /// An optional condition expression gating whether redaction applies
    /// (e.g. only in production); evaluated by the caller, not this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl FieldAnnotation {
    pub fn new(pii_type: PiiType, strategy: Strategy) -> Self {
        Self {
            pii_type,
            strategy,
            level: Level::default(),
            encrypt_key: None,
            condition: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_encrypt_key(mut self, key: impl Into<String>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}
