//! The publisher pipeline (§4.2): assembles an envelope for a payload,
//! serializes it, and dispatches it to a broker with retry, DLQ
//! fallback, and file-backup as a last resort. Sync and async dispatch
//! modes share the same send/retry/DLQ/backup chain; only where it runs
//! (inline vs. on the graceful executor) differs.

pub mod broker;
pub mod context;
pub mod error;
pub mod kafka_broker;
pub mod publisher;
pub mod retry;

pub use broker::{BrokerClient, BrokerError};
pub use context::{ContextProvider, StaticContextProvider};
pub use error::PublishError;
pub use kafka_broker::KafkaBrokerClient;
pub use publisher::{Publisher, PublisherConfig};
pub use retry::{dispatch_with_retry, DispatchOutcome, RetryConfig};
