//! Core event data model.
//!
//! Defines the entities that flow through the publishing runtime:
//! [`EventEnvelope`] and the metadata/context types it carries, plus the
//! construction-time error taxonomy shared by all of them. The
//! transactional outbox's `OutboxEvent` and the schema registry's
//! `SchemaVersion`/`SchemaMigration` live in their own crates
//! (`curve-outbox`, `curve-schema`) since they depend on this crate
//! rather than the other way around.

pub mod actor;
pub mod data_key;
pub mod envelope;
pub mod error;
pub mod event_type;
pub mod id;
pub mod metadata;
pub mod schema;
pub mod severity;
pub mod source;
pub mod trace;

pub use actor::EventActor;
pub use data_key::DataKey;
pub use envelope::{EventEnvelope, RawEventEnvelope};
pub use error::EnvelopeError;
pub use event_type::EventType;
pub use id::EventId;
pub use metadata::EventMetadata;
pub use schema::EventSchema;
pub use severity::Severity;
pub use source::EventSource;
pub use trace::EventTrace;
