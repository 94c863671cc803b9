use crate::actor::EventActor;
use crate::schema::EventSchema;
use crate::source::EventSource;
use crate::trace::EventTrace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything attached to an envelope besides its payload: where it came
/// from, who caused it, its trace coordinates, its schema, and free-form
/// tags.
///
/// `tags` is copied at construction time; mutating the caller's map
/// afterward has no effect on the stored metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    source: EventSource,
    actor: EventActor,
    trace: EventTrace,
    schema: EventSchema,
    tags: HashMap<String, String>,
}

impl EventMetadata {
    pub fn new(
        source: EventSource,
        actor: EventActor,
        trace: EventTrace,
        schema: EventSchema,
        tags: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            source,
            actor,
            trace,
            schema,
            tags: tags.unwrap_or_default(),
        }
    }

    pub fn source(&self) -> &EventSource {
        &self.source
    }

    pub fn actor(&self) -> &EventActor {
        &self.actor
    }

    pub fn trace(&self) -> &EventTrace {
        &self.trace
    }

    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }
}
