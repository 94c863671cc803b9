use curve_redaction::FieldAnnotation;

/// Implemented by payload types that carry PII fields. Field names are
/// the same keys the type serializes under, not Rust identifiers (so a
/// `#[serde(rename)]`'d field is addressed by its wire name here too).
pub trait Redactable {
    fn field_annotations() -> Vec<(&'static str, FieldAnnotation)>;
}

/// Payloads with nothing to redact opt out with this no-op impl rather
/// than hand-rolling an empty `field_annotations`.
#[macro_export]
macro_rules! no_pii_fields {
    ($ty:ty) => {
        impl $crate::Redactable for $ty {
            fn field_annotations() -> Vec<(&'static str, curve_redaction::FieldAnnotation)> {
                Vec::new()
            }
        }
    };
}
