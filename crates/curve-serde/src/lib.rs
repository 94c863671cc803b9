//! Envelope wire serialization (§6) with field-level redaction applied
//! to the payload at serialize time.

pub mod error;
pub mod redactable;
pub mod serializer;

pub use error::SerdeError;
pub use redactable::Redactable;
pub use serializer::EnvelopeSerializer;
