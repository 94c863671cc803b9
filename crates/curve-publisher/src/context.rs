use curve_model::{EventActor, EventSchema, EventSource, EventTrace};
use std::collections::HashMap;

/// Produces the contextual metadata (`source`, `actor`, `trace`,
/// `schema`, `tags`) the envelope factory stamps onto every event.
///
/// Implementations typically read `actor`/`trace` from request-scoped
/// state (e.g. a tracing span, an async-local) the core has no opinion
/// about; `source` is usually static per process.
pub trait ContextProvider: Send + Sync {
    fn source(&self) -> EventSource;

    fn actor(&self) -> EventActor {
        EventActor::new()
    }

    fn trace(&self) -> EventTrace {
        EventTrace::new()
    }

    fn schema_for(&self, event_type: &str) -> EventSchema;

    fn tags(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// A `ContextProvider` with a fixed `source` and schema version 1 for
/// every event type, sufficient for services with no per-call actor or
/// trace context to attach.
pub struct StaticContextProvider {
    source: EventSource,
}

impl StaticContextProvider {
    pub fn new(source: EventSource) -> Self {
        Self { source }
    }
}

impl ContextProvider for StaticContextProvider {
    fn source(&self) -> EventSource {
        self.source.clone()
    }

    fn schema_for(&self, event_type: &str) -> EventSchema {
        EventSchema::new(event_type, 1).expect("event_type used as a schema name must be non-blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_defaults_actor_and_trace_to_empty() {
        let provider = StaticContextProvider::new(EventSource::new("orders").unwrap());
        assert!(provider.actor().id().is_none());
        assert!(provider.trace().trace_id().is_none());
        assert!(provider.tags().is_empty());
    }

    #[test]
    fn static_provider_schema_uses_event_type_as_name() {
        let provider = StaticContextProvider::new(EventSource::new("orders").unwrap());
        let schema = provider.schema_for("order.created");
        assert_eq!(schema.name(), "order.created");
        assert_eq!(schema.version(), 1);
    }
}
