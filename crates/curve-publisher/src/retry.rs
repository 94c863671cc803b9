use crate::broker::BrokerError;
use std::time::Duration;

/// Exponential backoff bounded by `max_interval`, up to `max_attempts`
/// total attempts (the first send plus `max_attempts - 1` retries).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(200),
            multiplier: 2.0,
            max_interval: Duration::from_secs(10),
        }
    }
}

/// Outcome of running the main send through the retry loop.
pub enum DispatchOutcome {
    Success,
    /// Exhausted retries (or retry disabled) on a transient error, or
    /// hit a non-transient error on the first attempt.
    Failed(BrokerError),
}

/// Retries `send` while it returns a transient [`BrokerError`], waiting
/// with exponential backoff between attempts. A permanent error, or
/// exhausting `config.max_attempts`, ends the loop immediately.
pub async fn dispatch_with_retry<F, Fut>(config: Option<&RetryConfig>, mut send: F) -> DispatchOutcome
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), BrokerError>>,
{
    let Some(config) = config else {
        return match send().await {
            Ok(()) => DispatchOutcome::Success,
            Err(e) => DispatchOutcome::Failed(e),
        };
    };

    let mut attempt: u32 = 0;
    let mut backoff = config.initial_interval;

    loop {
        attempt += 1;
        match send().await {
            Ok(()) => return DispatchOutcome::Success,
            Err(e) if !e.is_transient() => return DispatchOutcome::Failed(e),
            Err(e) => {
                if attempt >= config.max_attempts {
                    return DispatchOutcome::Failed(e);
                }
                tracing::warn!(attempt, max_attempts = config.max_attempts, error = %e, "retrying publish after transient broker error");
                tokio::time::sleep(backoff).await;
                let next_millis = (backoff.as_millis() as f64 * config.multiplier)
                    .min(config.max_interval.as_millis() as f64);
                backoff = Duration::from_millis(next_millis as u64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_works() {
        let calls = AtomicU32::new(0);
        let outcome = dispatch_with_retry(Some(&RetryConfig::default()), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
        assert!(matches!(outcome, DispatchOutcome::Success));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_attempts: 5,
            initial_interval: Duration::from_millis(1),
            multiplier: 2.0,
            max_interval: Duration::from_millis(10),
        };
        let outcome = dispatch_with_retry(Some(&config), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(BrokerError::Transient("timeout".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(matches!(outcome, DispatchOutcome::Success));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let outcome = dispatch_with_retry(Some(&RetryConfig::default()), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BrokerError::Permanent("unauthorized".to_string())) }
        })
        .await;
        assert!(matches!(outcome, DispatchOutcome::Failed(BrokerError::Permanent(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_attempts: 3,
            initial_interval: Duration::from_millis(1),
            multiplier: 2.0,
            max_interval: Duration::from_millis(5),
        };
        let outcome = dispatch_with_retry(Some(&config), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BrokerError::Transient("timeout".to_string())) }
        })
        .await;
        assert!(matches!(outcome, DispatchOutcome::Failed(BrokerError::Transient(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn no_config_sends_exactly_once() {
        let calls = AtomicU32::new(0);
        let outcome = dispatch_with_retry(None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BrokerError::Transient("timeout".to_string())) }
        })
        .await;
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
