//! Snowflake-style 64-bit id generator.
//!
//! Layout (high to low bit): `sign(1) | timestamp_ms(41) | worker_id(10) |
//! sequence(12)`. The timestamp is milliseconds since [`CURVE_EPOCH_MILLIS`],
//! not the Unix epoch, to keep 41 bits from overflowing for decades.
//!
//! `generate()` serializes the read-modify-write of `(last_timestamp,
//! sequence)` behind a mutex: correctness (strictly increasing ids, per
//! §4.1) matters more than lock-free throughput here.

use curve_clock::Clock;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

/// 2020-01-01T00:00:00Z, used as the generator's zero point so the 41-bit
/// timestamp field doesn't roll over until 2089.
pub const CURVE_EPOCH_MILLIS: i64 = 1_577_836_800_000;

const WORKER_ID_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
pub const MAX_WORKER_ID: u16 = (1 << WORKER_ID_BITS) - 1; // 1023
const MAX_SEQUENCE: u16 = (1 << SEQUENCE_BITS) - 1; // 4095
const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;

/// Clock regressions up to this many milliseconds are worth spinning out.
/// Beyond it we fail fast rather than stall the caller.
const MAX_BACKWARD_WAIT_MILLIS: i64 = 100;
/// Absolute ceiling on time spent spinning through a clock regression.
const MAX_CUMULATIVE_SPIN: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum IdGenError {
    #[error(
        "clock moved backwards: last_timestamp={last_timestamp}ms current_timestamp={current_timestamp}ms diff={diff_ms}ms"
    )]
    ClockMovedBackwards {
        last_timestamp: i64,
        current_timestamp: i64,
        diff_ms: i64,
    },

    #[error("worker_id {0} out of range [0, {MAX_WORKER_ID}]")]
    InvalidWorkerId(u16),
}

/// Object-safe façade over [`SnowflakeGenerator`], so callers that don't
/// care which clock backs the generator can hold `Arc<dyn IdGenerator>`.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<i64, IdGenError>;
}

impl<C: Clock + Send + Sync> IdGenerator for SnowflakeGenerator<C> {
    fn generate(&self) -> Result<i64, IdGenError> {
        SnowflakeGenerator::generate(self)
    }
}

struct GeneratorState {
    last_timestamp: i64,
    sequence: u16,
}

/// A Snowflake-style id generator bound to one `worker_id` and one clock.
///
/// Distinct generators (distinct `worker_id`s) never collide; the same
/// generator produces a strictly increasing sequence of ids for its
/// process's lifetime.
pub struct SnowflakeGenerator<C: Clock> {
    clock: C,
    worker_id: u16,
    state: Mutex<GeneratorState>,
}

impl<C: Clock> SnowflakeGenerator<C> {
    pub fn new(clock: C, worker_id: u16) -> Result<Self, IdGenError> {
        if worker_id > MAX_WORKER_ID {
            return Err(IdGenError::InvalidWorkerId(worker_id));
        }
        Ok(Self {
            clock,
            worker_id,
            state: Mutex::new(GeneratorState {
                last_timestamp: -1,
                sequence: 0,
            }),
        })
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }

    /// Produce the next id. Strictly greater than every id this generator
    /// has previously returned.
    pub fn generate(&self) -> Result<i64, IdGenError> {
        loop {
            let mut state = self.state.lock();
            let now = self.clock.now_millis();

            if now > state.last_timestamp {
                state.sequence = 0;
                state.last_timestamp = now;
                return Ok(self.compose(now, state.sequence));
            }

            if now == state.last_timestamp {
                if state.sequence >= MAX_SEQUENCE {
                    let target = state.last_timestamp;
                    drop(state);
                    self.spin_until_next_millis(target)?;
                    continue;
                }
                state.sequence += 1;
                let seq = state.sequence;
                return Ok(self.compose(now, seq));
            }

            // now < last_timestamp: the clock regressed.
            let last_timestamp = state.last_timestamp;
            let diff_ms = last_timestamp - now;
            if diff_ms > MAX_BACKWARD_WAIT_MILLIS {
                return Err(IdGenError::ClockMovedBackwards {
                    last_timestamp,
                    current_timestamp: now,
                    diff_ms,
                });
            }

            drop(state);
            self.spin_through_regression(last_timestamp)?;
            // loop again: now the clock should have caught up.
        }
    }

    fn compose(&self, timestamp_ms: i64, sequence: u16) -> i64 {
        let rel_timestamp = timestamp_ms - CURVE_EPOCH_MILLIS;
        (rel_timestamp << TIMESTAMP_SHIFT)
            | ((self.worker_id as i64) << WORKER_ID_SHIFT)
            | sequence as i64
    }

    /// Busy-wait for the clock to tick past `target` millisecond, used when
    /// the 12-bit sequence exhausts within a single millisecond.
    fn spin_until_next_millis(&self, target: i64) -> Result<(), IdGenError> {
        let deadline = std::time::Instant::now() + MAX_CUMULATIVE_SPIN;
        loop {
            if self.clock.now_millis() > target {
                return Ok(());
            }
            if std::time::Instant::now() >= deadline {
                let now = self.clock.now_millis();
                return Err(IdGenError::ClockMovedBackwards {
                    last_timestamp: target,
                    current_timestamp: now,
                    diff_ms: target - now,
                });
            }
            std::hint::spin_loop();
        }
    }

    /// Exponential backoff (1ms, 2ms, 4ms, ... capped at 100ms) while the
    /// clock crawls back past `last_timestamp`, per §4.1.
    fn spin_through_regression(&self, last_timestamp: i64) -> Result<(), IdGenError> {
        let start = std::time::Instant::now();
        let mut backoff = Duration::from_millis(1);
        loop {
            std::thread::sleep(backoff);

            let now = self.clock.now_millis();
            if now > last_timestamp {
                return Ok(());
            }

            if start.elapsed() >= MAX_CUMULATIVE_SPIN {
                let diff_ms = last_timestamp - now;
                tracing::warn!(
                    last_timestamp,
                    current_timestamp = now,
                    diff_ms,
                    "id generator gave up waiting out a clock regression"
                );
                return Err(IdGenError::ClockMovedBackwards {
                    last_timestamp,
                    current_timestamp: now,
                    diff_ms,
                });
            }

            backoff = (backoff * 2).min(Duration::from_millis(MAX_BACKWARD_WAIT_MILLIS as u64));
        }
    }
}

/// Hash a stable host identifier into `[0, 1023]`.
///
/// Advisory only: two hosts whose identifiers hash to the same worker id
/// will silently produce colliding ids. Operators are responsible for
/// configuring distinct `worker_id`s when that risk is unacceptable.
pub fn derive_worker_id(host_identifier: &str) -> u16 {
    let digest = Sha256::digest(host_identifier.as_bytes());
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&digest[0..2]);
    u16::from_be_bytes(bytes) & MAX_WORKER_ID
}

/// Best-effort stable host identifier: `HOSTNAME` env var, falling back to
/// a fixed placeholder if unset (e.g. in minimal containers).
pub fn local_host_identifier() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}
