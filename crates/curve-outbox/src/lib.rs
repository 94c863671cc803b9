//! Transactional outbox (§4.5): a table co-transacted with business
//! state, drained to the broker by a poller behind a circuit breaker
//! with dynamic batch sizing, plus a retention-based cleanup sweep.

pub mod batch;
pub mod circuit_breaker;
pub mod cleanup;
pub mod error;
pub mod model;
pub mod poller;
pub mod repository;
pub mod testing;

pub use batch::{effective_batch_size, next_retry_delay_millis};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use cleanup::{CleanupConfig, OutboxCleanup};
pub use error::OutboxError;
pub use model::{truncate_error, OutboxEvent, OutboxStatus};
pub use poller::{OutboxPoller, PollerConfig};
pub use repository::{OutboxRepository, SqlxOutboxRepository};
