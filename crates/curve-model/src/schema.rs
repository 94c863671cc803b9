use crate::error::EnvelopeError;
use serde::{Deserialize, Serialize};

/// Identifies the payload shape carried by an envelope: a name plus a
/// monotonically increasing version, used as the registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchema {
    name: String,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_id: Option<String>,
}

impl EventSchema {
    pub fn new(name: impl Into<String>, version: u32) -> Result<Self, EnvelopeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EnvelopeError::Blank("schema.name"));
        }
        if version < 1 {
            return Err(EnvelopeError::InvalidEvent(
                "schema.version must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            name,
            version,
            schema_id: None,
        })
    }

    pub fn with_schema_id(mut self, schema_id: impl Into<String>) -> Self {
        self.schema_id = Some(schema_id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    /// Registry lookup key: `"{name}:v{version}"`.
    pub fn key(&self) -> String {
        format!("{}:v{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        assert!(EventSchema::new("", 1).is_err());
    }

    #[test]
    fn rejects_version_below_one() {
        assert!(EventSchema::new("order", 0).is_err());
    }

    #[test]
    fn key_format() {
        let s = EventSchema::new("order", 3).unwrap();
        assert_eq!(s.key(), "order:v3");
    }
}
