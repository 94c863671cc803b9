use crate::error::EnvelopeError;
use crate::event_type::EventType;
use crate::id::EventId;
use crate::metadata::EventMetadata;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The wire envelope: identity, classification, metadata, and payload,
/// wrapped around a domain event.
///
/// All seven fields are required; a missing one is a construction
/// failure (`EnvelopeError::MissingField`), checked before the
/// `occurredAt <= publishedAt` invariant is even evaluated. The envelope
/// itself has no setters — the only way to change `publishedAt` is
/// [`EventEnvelope::restamp`], which produces a new, independently
/// validated instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "T: Serialize + for<'de2> Deserialize<'de2>")]
pub struct EventEnvelope<T> {
    event_id: EventId,
    event_type: EventType,
    severity: Severity,
    metadata: EventMetadata,
    payload: T,
    occurred_at: DateTime<Utc>,
    published_at: DateTime<Utc>,
}

impl<T> EventEnvelope<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: EventId,
        event_type: EventType,
        severity: Severity,
        metadata: EventMetadata,
        payload: T,
        occurred_at: DateTime<Utc>,
        published_at: DateTime<Utc>,
    ) -> Result<Self, EnvelopeError> {
        if occurred_at > published_at {
            return Err(EnvelopeError::InvalidEvent(format!(
                "occurredAt ({occurred_at}) must be <= publishedAt ({published_at})"
            )));
        }
        Ok(Self {
            event_id,
            event_type,
            severity,
            metadata,
            payload,
            occurred_at,
            published_at,
        })
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// Produce a new envelope with `publishedAt` replaced, re-checking
    /// the invariant. Used by the publisher when a retry attempt
    /// re-dispatches an envelope assembled earlier.
    pub fn restamp(&self, published_at: DateTime<Utc>) -> Result<Self, EnvelopeError>
    where
        T: Clone,
    {
        Self::new(
            self.event_id.clone(),
            self.event_type.clone(),
            self.severity,
            self.metadata.clone(),
            self.payload.clone(),
            self.occurred_at,
            published_at,
        )
    }
}

/// Wire-shape mirror of [`EventEnvelope`] with every field optional, used
/// to distinguish "field absent" from "field present but invalid" when
/// parsing externally-supplied JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound = "T: for<'de2> Deserialize<'de2>")]
pub struct RawEventEnvelope<T> {
    pub event_id: Option<EventId>,
    pub event_type: Option<EventType>,
    pub severity: Option<Severity>,
    pub metadata: Option<EventMetadata>,
    pub payload: Option<T>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl<T> TryFrom<RawEventEnvelope<T>> for EventEnvelope<T> {
    type Error = EnvelopeError;

    fn try_from(raw: RawEventEnvelope<T>) -> Result<Self, Self::Error> {
        let event_id = raw.event_id.ok_or(EnvelopeError::MissingField("eventId"))?;
        let event_type = raw
            .event_type
            .ok_or(EnvelopeError::MissingField("eventType"))?;
        let severity = raw.severity.ok_or(EnvelopeError::MissingField("severity"))?;
        let metadata = raw.metadata.ok_or(EnvelopeError::MissingField("metadata"))?;
        let payload = raw.payload.ok_or(EnvelopeError::MissingField("payload"))?;
        let occurred_at = raw
            .occurred_at
            .ok_or(EnvelopeError::MissingField("occurredAt"))?;
        let published_at = raw
            .published_at
            .ok_or(EnvelopeError::MissingField("publishedAt"))?;

        EventEnvelope::new(
            event_id,
            event_type,
            severity,
            metadata,
            payload,
            occurred_at,
            published_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::EventActor;
    use crate::schema::EventSchema;
    use crate::source::EventSource;
    use crate::trace::EventTrace;
    use chrono::Duration;

    fn metadata() -> EventMetadata {
        EventMetadata::new(
            EventSource::new("orders").unwrap(),
            EventActor::new(),
            EventTrace::new(),
            EventSchema::new("order.created", 1).unwrap(),
            None,
        )
    }

    #[test]
    fn accepts_occurred_at_equal_published_at() {
        let now = Utc::now();
        let env = EventEnvelope::new(
            EventId::from_raw(1),
            EventType::new("order.created").unwrap(),
            Severity::Info,
            metadata(),
            serde_json::json!({"amount": 5}),
            now,
            now,
        );
        assert!(env.is_ok());
    }

    #[test]
    fn rejects_occurred_at_after_published_at() {
        let now = Utc::now();
        let env = EventEnvelope::new(
            EventId::from_raw(1),
            EventType::new("order.created").unwrap(),
            Severity::Info,
            metadata(),
            serde_json::json!({}),
            now,
            now - Duration::seconds(1),
        );
        assert!(matches!(env, Err(EnvelopeError::InvalidEvent(_))));
    }

    #[test]
    fn raw_envelope_missing_field_fails_construction_before_invariant_check() {
        let raw: RawEventEnvelope<serde_json::Value> = RawEventEnvelope {
            event_id: Some(EventId::from_raw(1)),
            event_type: None,
            severity: Some(Severity::Info),
            metadata: Some(metadata()),
            payload: Some(serde_json::json!({})),
            occurred_at: Some(Utc::now()),
            published_at: Some(Utc::now()),
        };
        let result = EventEnvelope::try_from(raw);
        assert_eq!(result.unwrap_err(), EnvelopeError::MissingField("eventType"));
    }

    #[test]
    fn restamp_produces_new_validated_instance() {
        let now = Utc::now();
        let env = EventEnvelope::new(
            EventId::from_raw(1),
            EventType::new("order.created").unwrap(),
            Severity::Info,
            metadata(),
            serde_json::json!({}),
            now,
            now,
        )
        .unwrap();
        let later = now + Duration::seconds(10);
        let restamped = env.restamp(later).unwrap();
        assert_eq!(restamped.published_at(), later);
        assert_eq!(restamped.occurred_at(), now);
    }
}
