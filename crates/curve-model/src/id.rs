use crate::error::EnvelopeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique event id, carried on the wire as `{"value": "<decimal string>"}`.
///
/// Internally this is just a non-blank string; `curve-id` is the component
/// that actually generates the 64-bit numeric values this type wraps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    value: String,
}

impl EventId {
    /// Wrap a generated 64-bit id.
    pub fn from_raw(id: i64) -> Self {
        Self {
            value: id.to_string(),
        }
    }

    /// Parse an externally-supplied id string, rejecting blank input.
    pub fn parse(raw: impl Into<String>) -> Result<Self, EnvelopeError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(EnvelopeError::Blank("eventId"));
        }
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
