//! Injectable wall-clock source.
//!
//! The id generator and outbox poller both need to read "now" and, in
//! tests, rewind or fast-forward it. Everything downstream takes `&dyn
//! Clock` (or a generic `C: Clock`) rather than calling `Utc::now()`
//! directly.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A source of "now", millisecond precision, UTC.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Current instant as a UTC timestamp.
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis()).unwrap_or_else(Utc::now)
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// The real clock: reads the operating system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A settable clock for deterministic tests. Starts at the Unix epoch
/// unless constructed with [`FakeClock::at`].
#[derive(Debug)]
pub struct FakeClock {
    millis: AtomicI64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            millis: AtomicI64::new(0),
        }
    }

    pub fn at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, by_millis: i64) {
        self.millis.fetch_add(by_millis, Ordering::SeqCst);
    }

    /// Move the clock backwards by `by_millis` (for clock-regression tests).
    pub fn rewind(&self, by_millis: i64) {
        self.millis.fetch_sub(by_millis, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_ish() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn fake_clock_advances_and_rewinds() {
        let clock = FakeClock::at(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
        clock.rewind(200);
        assert_eq!(clock.now_millis(), 1_300);
    }

    #[test]
    fn now_converts_millis_to_datetime() {
        let clock = FakeClock::at(1_700_000_000_000);
        let dt = clock.now();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }
}
