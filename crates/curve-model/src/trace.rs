use serde::{Deserialize, Serialize};

/// Distributed-tracing coordinates attached to an event. All fields are
/// optional; this is metadata, not identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_unset() {
        let t = EventTrace::new();
        assert!(t.trace_id().is_none());
        assert!(t.span_id().is_none());
        assert!(t.correlation_id().is_none());
    }

    #[test]
    fn builders_set_fields() {
        let t = EventTrace::new()
            .with_trace_id("trace-1")
            .with_span_id("span-1")
            .with_correlation_id("corr-1");
        assert_eq!(t.trace_id(), Some("trace-1"));
        assert_eq!(t.span_id(), Some("span-1"));
        assert_eq!(t.correlation_id(), Some("corr-1"));
    }
}
