use crate::error::EnvelopeError;
use serde::{Deserialize, Serialize};

/// Where an event originated, plus the causal chain it belongs to.
///
/// `service` is the only required field; the rest describe the emitting
/// process and may be left unset by callers that don't track them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    causation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root_event_id: Option<String>,
}

impl EventSource {
    pub fn new(service: impl Into<String>) -> Result<Self, EnvelopeError> {
        let service = service.into();
        if service.trim().is_empty() {
            return Err(EnvelopeError::Blank("source.service"));
        }
        Ok(Self {
            service,
            environment: None,
            instance_id: None,
            host: None,
            version: None,
            correlation_id: None,
            causation_id: None,
            root_event_id: None,
        })
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    pub fn with_root_event_id(mut self, id: impl Into<String>) -> Self {
        self.root_event_id = Some(id.into());
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn root_event_id(&self) -> Option<&str> {
        self.root_event_id.as_deref()
    }

    /// An event is its own chain root when it has no causation id.
    pub fn is_root_event(&self) -> bool {
        match &self.causation_id {
            None => true,
            Some(c) => c.trim().is_empty(),
        }
    }

    /// 0 = no chain at all, 1 = this event is the root, 2 = child of a root.
    pub fn chain_depth(&self) -> u8 {
        if self.correlation_id.is_none() && self.root_event_id.is_none() {
            return 0;
        }
        if self.is_root_event() {
            1
        } else {
            2
        }
    }
}
