//! Gate in front of the poller (§4.5 step 1), adapted from the teacher's
//! sliding-window breaker to the simpler consecutive-count semantics the
//! outbox spec describes: open after `failure_threshold` consecutive
//! failures, close on the very next success once in OPEN or HALF_OPEN.
//! No error-rate window here, since nothing in the outbox design calls
//! for one.

use curve_clock::Clock;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(60),
        }
    }
}

struct State {
    current: CircuitState,
    consecutive_failures: u32,
    opened_at_millis: Option<i64>,
}

pub struct CircuitBreaker<C: Clock> {
    config: CircuitBreakerConfig,
    clock: C,
    state: Mutex<State>,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(config: CircuitBreakerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(State {
                current: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at_millis: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state.lock().current
    }

    /// Call once per poller tick before claiming a batch. Returns `true`
    /// if the tick should proceed (CLOSED, or OPEN with the cooldown
    /// elapsed, in which case this transitions to HALF_OPEN and lets the
    /// tick through).
    pub fn allow_tick(&self) -> bool {
        let mut state = self.state.lock();
        match state.current {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = state
                    .opened_at_millis
                    .map(|opened| self.clock.now_millis() - opened)
                    .unwrap_or(i64::MAX);
                if elapsed >= self.config.open_duration.as_millis() as i64 {
                    tracing::info!("outbox circuit breaker: OPEN -> HALF_OPEN");
                    state.current = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures = 0;
        if state.current != CircuitState::Closed {
            tracing::info!("outbox circuit breaker: {:?} -> CLOSED", state.current);
        }
        state.current = CircuitState::Closed;
        state.opened_at_millis = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.config.failure_threshold {
            if state.current != CircuitState::Open {
                tracing::warn!(
                    consecutive_failures = state.consecutive_failures,
                    "outbox circuit breaker: {:?} -> OPEN",
                    state.current
                );
            }
            state.current = CircuitState::Open;
            state.opened_at_millis = Some(self.clock.now_millis());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve_clock::FakeClock;

    fn breaker(threshold: u32, open_duration_ms: u64) -> CircuitBreaker<FakeClock> {
        CircuitBreaker::new(
            CircuitBreakerConfig {
                failure_threshold: threshold,
                open_duration: Duration::from_millis(open_duration_ms),
            },
            FakeClock::new(),
        )
    }

    #[test]
    fn opens_after_consecutive_failures() {
        let cb = breaker(3, 1000);
        assert!(cb.allow_tick());
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn rejects_ticks_while_open_until_cooldown_elapses() {
        let cb = breaker(1, 100);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_tick());
    }

    #[test]
    fn success_in_half_open_closes_immediately() {
        let cb = breaker(1, 100);
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
