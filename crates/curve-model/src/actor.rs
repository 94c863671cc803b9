use serde::{Deserialize, Serialize};

/// Who (or what) caused an event. Fully optional — no validation is
/// performed at construction, callers supply whatever they know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
}

impl EventActor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_unset() {
        let a = EventActor::new();
        assert!(a.id().is_none());
        assert!(a.role().is_none());
        assert!(a.ip().is_none());
    }

    #[test]
    fn builders_set_fields() {
        let a = EventActor::new()
            .with_id("user-1")
            .with_role("admin")
            .with_ip("10.0.0.1");
        assert_eq!(a.id(), Some("user-1"));
        assert_eq!(a.role(), Some("admin"));
        assert_eq!(a.ip(), Some("10.0.0.1"));
    }
}
