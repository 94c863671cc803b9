use crate::error::SerdeError;
use crate::redactable::Redactable;
use curve_model::EventEnvelope;
use curve_redaction::RedactionEngine;
use serde::Serialize;
use serde_json::Value;

/// Turns an [`EventEnvelope`] into the wire JSON shape (§6), redacting
/// annotated payload fields in place. The envelope passed in is never
/// mutated — redaction happens on the serialized `Value`, not the typed
/// payload.
pub struct EnvelopeSerializer {
    redaction: RedactionEngine,
}

impl EnvelopeSerializer {
    pub fn new(redaction: RedactionEngine) -> Self {
        Self { redaction }
    }

    pub fn serialize<T>(&self, envelope: &EventEnvelope<T>) -> Result<Vec<u8>, SerdeError>
    where
        T: Serialize + Redactable,
    {
        let mut value = serde_json::to_value(envelope)?;
        self.redact_payload::<T>(&mut value)?;
        Ok(serde_json::to_vec(&value)?)
    }

    fn redact_payload<T: Redactable>(&self, envelope_value: &mut Value) -> Result<(), SerdeError> {
        let annotations = T::field_annotations();
        if annotations.is_empty() {
            return Ok(());
        }

        let payload = envelope_value
            .get_mut("payload")
            .and_then(Value::as_object_mut);
        let Some(payload) = payload else {
            return Ok(());
        };

        for (field, annotation) in annotations {
            let Some(current) = payload.get(field) else {
                continue;
            };
            let Some(s) = current.as_str() else {
                return Err(SerdeError::UnsupportedFieldType(field.to_string()));
            };
            let redacted = self.redaction.redact(s, &annotation)?;
            payload.insert(field.to_string(), Value::String(redacted));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::no_pii_fields;
    use chrono::Utc;
    use curve_model::{
        EventActor, EventId, EventMetadata, EventSchema, EventSource, EventType, EventTrace,
        Severity,
    };
    use curve_redaction::{FieldAnnotation, PiiType, Strategy};
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct OrderCreated {
        order_id: String,
        customer_email: String,
    }

    impl Redactable for OrderCreated {
        fn field_annotations() -> Vec<(&'static str, FieldAnnotation)> {
            vec![(
                "customer_email",
                FieldAnnotation::new(PiiType::Email, Strategy::Mask),
            )]
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct NoPii {
        value: i32,
    }
    no_pii_fields!(NoPii);

    fn envelope<T>(payload: T) -> EventEnvelope<T> {
        let now = Utc::now();
        EventEnvelope::new(
            EventId::from_raw(1),
            EventType::new("order.created").unwrap(),
            Severity::Info,
            EventMetadata::new(
                EventSource::new("orders").unwrap(),
                EventActor::new(),
                EventTrace::new(),
                EventSchema::new("order.created", 1).unwrap(),
                None,
            ),
            payload,
            now,
            now,
        )
        .unwrap()
    }

    #[test]
    fn redacts_annotated_field_in_place() {
        let serializer = EnvelopeSerializer::new(RedactionEngine::builder().build().unwrap());
        let env = envelope(OrderCreated {
            order_id: "o-1".to_string(),
            customer_email: "jsmith@example.com".to_string(),
        });
        let bytes = serializer.serialize(&env).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["payload"]["order_id"], Value::String("o-1".to_string()));
        assert_ne!(
            value["payload"]["customer_email"],
            Value::String("jsmith@example.com".to_string())
        );
    }

    #[test]
    fn wire_shape_matches_envelope_contract() {
        let serializer = EnvelopeSerializer::new(RedactionEngine::builder().build().unwrap());
        let env = envelope(NoPii { value: 5 });
        let bytes = serializer.serialize(&env).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("eventId").is_some());
        assert!(value.get("eventType").is_some());
        assert!(value.get("severity").is_some());
        assert!(value.get("metadata").is_some());
        assert!(value.get("payload").is_some());
        assert!(value.get("occurredAt").is_some());
        assert!(value.get("publishedAt").is_some());
        assert_eq!(value["eventId"]["value"], Value::String("1".to_string()));
    }

    #[test]
    fn no_pii_fields_is_a_no_op() {
        let serializer = EnvelopeSerializer::new(RedactionEngine::builder().build().unwrap());
        let env = envelope(NoPii { value: 5 });
        let bytes = serializer.serialize(&env).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["payload"]["value"], Value::Number(5.into()));
    }
}
