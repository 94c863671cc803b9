use crate::error::EnvelopeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The event's type tag, wire-encoded as `{"value": "<string>"}` (§6),
/// same envelope shape as `EventId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType {
    value: String,
}

impl EventType {
    pub fn new(raw: impl Into<String>) -> Result<Self, EnvelopeError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(EnvelopeError::Blank("eventType"));
        }
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank() {
        assert!(EventType::new("").is_err());
        assert!(EventType::new("  ").is_err());
    }

    #[test]
    fn wire_shape_is_value_wrapper() {
        let t = EventType::new("order.created").unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json, serde_json::json!({"value": "order.created"}));
    }
}
