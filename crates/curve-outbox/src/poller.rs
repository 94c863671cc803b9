use crate::batch::{effective_batch_size, next_retry_delay_millis};
use crate::circuit_breaker::CircuitBreaker;
use crate::model::OutboxEvent;
use crate::repository::OutboxRepository;
use curve_clock::Clock;
use curve_metrics::MetricsSink;
use curve_publisher::BrokerClient;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub batch_size: i64,
    pub max_retries: i32,
    pub send_timeout: Duration,
    pub dynamic_batch_enabled: bool,
    pub circuit_breaker_enabled: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            batch_size: 100,
            max_retries: 5,
            send_timeout: Duration::from_secs(10),
            dynamic_batch_enabled: true,
            circuit_breaker_enabled: true,
        }
    }
}

/// Drains PENDING rows to the broker, one tick at a time. `tick()` is the
/// unit that tests drive directly against a fake clock and an in-memory
/// repository; `run()` just wraps it in an interval loop.
pub struct OutboxPoller<R: OutboxRepository, B: BrokerClient, C: Clock> {
    repository: Arc<R>,
    broker: Arc<B>,
    clock: Arc<C>,
    breaker: CircuitBreaker<Arc<C>>,
    metrics: Arc<dyn MetricsSink>,
    config: PollerConfig,
    /// How an event type maps to a broker topic; defaults to using the
    /// event type itself as the topic name.
    topic_for: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl<R: OutboxRepository, B: BrokerClient, C: Clock> OutboxPoller<R, B, C> {
    pub fn new(
        repository: Arc<R>,
        broker: Arc<B>,
        clock: Arc<C>,
        config: PollerConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let breaker = CircuitBreaker::new(Default::default(), clock.clone());
        Self {
            repository,
            broker,
            clock,
            breaker,
            metrics,
            config,
            topic_for: Box::new(|event_type: &str| event_type.to_string()),
        }
    }

    pub fn with_topic_resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.topic_for = Box::new(f);
        self
    }

    pub fn circuit_state(&self) -> crate::circuit_breaker::CircuitState {
        self.breaker.state()
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                tracing::error!(error = %e, "outbox poller tick failed");
            }
        }
    }

    /// Runs one poll cycle: breaker gate, batch-size computation, claim,
    /// send each claimed row, record outcomes. Returns the number of rows
    /// successfully published this tick.
    pub async fn tick(&self) -> Result<usize, crate::error::OutboxError> {
        if self.config.circuit_breaker_enabled && !self.breaker.allow_tick() {
            tracing::debug!("outbox poller tick skipped, circuit breaker open");
            return Ok(0);
        }

        let now = self.clock.now();
        let pending = self.repository.pending_count().await?;
        self.metrics.set_outbox_pending(pending);
        self.metrics
            .set_outbox_oldest_pending_age_seconds(self.repository.oldest_pending_age_seconds(now).await?);

        let limit = if self.config.dynamic_batch_enabled {
            effective_batch_size(pending, self.config.batch_size)
        } else {
            self.config.batch_size
        };

        let batch = self.repository.claim_batch(now, limit).await?;
        let mut published = 0usize;
        for event in &batch {
            if self.send_one(event, now).await {
                published += 1;
            }
        }

        Ok(published)
    }

    async fn send_one(&self, event: &OutboxEvent, now: chrono::DateTime<chrono::Utc>) -> bool {
        let topic = (self.topic_for)(&event.event_type);
        let send = self.broker.send(&topic, &event.event_id, event.payload.as_bytes());

        let outcome = tokio::time::timeout(self.config.send_timeout, send).await;
        match outcome {
            Ok(Ok(())) => {
                if let Err(e) = self.repository.mark_published(&event.event_id, now).await {
                    tracing::error!(event_id = %event.event_id, error = %e, "failed to mark outbox event published");
                    return false;
                }
                self.metrics.record_outbox_published();
                if self.config.circuit_breaker_enabled {
                    self.breaker.record_success();
                }
                true
            }
            Ok(Err(e)) => {
                self.handle_failure(event, now, &e.to_string()).await;
                false
            }
            Err(_) => {
                self.handle_failure(event, now, "send timed out").await;
                false
            }
        }
    }

    async fn handle_failure(&self, event: &OutboxEvent, now: chrono::DateTime<chrono::Utc>, message: &str) {
        let next_retry_at = now + chrono::Duration::milliseconds(next_retry_delay_millis(event.retry_count));
        if let Err(e) = self
            .repository
            .mark_failed(&event.event_id, now, next_retry_at, message, self.config.max_retries)
            .await
        {
            tracing::error!(event_id = %event.event_id, error = %e, "failed to mark outbox event failed");
        }
        self.metrics.record_outbox_failed();
        if self.config.circuit_breaker_enabled {
            self.breaker.record_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutboxStatus;
    use crate::testing::InMemoryOutboxRepository;
    use async_trait::async_trait;
    use curve_clock::FakeClock;
    use curve_metrics::NoOpMetricsSink;
    use curve_publisher::BrokerError;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct ToggleableBroker {
        fail: AtomicBool,
        calls: AtomicU32,
    }

    #[async_trait]
    impl BrokerClient for ToggleableBroker {
        async fn send(&self, _topic: &str, _key: &str, _value: &[u8]) -> Result<(), BrokerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(BrokerError::Transient("down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn repo_with_one_pending(clock: &FakeClock) -> Arc<InMemoryOutboxRepository> {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        repo.insert_directly(OutboxEvent::new("1", "order", "o-1", "order.created", "{}", clock.now()));
        repo
    }

    #[tokio::test]
    async fn successful_tick_publishes_and_second_tick_is_empty() {
        let clock = Arc::new(FakeClock::at(1_700_000_000_000));
        let repo = repo_with_one_pending(&clock);
        let broker = Arc::new(ToggleableBroker {
            fail: AtomicBool::new(false),
            calls: AtomicU32::new(0),
        });
        let poller = OutboxPoller::new(repo.clone(), broker, clock, PollerConfig::default(), Arc::new(NoOpMetricsSink));

        let published = poller.tick().await.unwrap();
        assert_eq!(published, 1);
        assert_eq!(repo.snapshot()[0].status, OutboxStatus::Published);

        let published_again = poller.tick().await.unwrap();
        assert_eq!(published_again, 0);
    }

    #[tokio::test]
    async fn five_consecutive_failures_open_the_breaker_and_skip_ticks() {
        let clock = Arc::new(FakeClock::at(1_700_000_000_000));
        let repo = Arc::new(InMemoryOutboxRepository::new());
        for i in 0..5 {
            repo.insert_directly(OutboxEvent::new(
                i.to_string(),
                "order",
                "o-1",
                "order.created",
                "{}",
                clock.now(),
            ));
        }
        let broker = Arc::new(ToggleableBroker {
            fail: AtomicBool::new(true),
            calls: AtomicU32::new(0),
        });
        let config = PollerConfig {
            batch_size: 1,
            dynamic_batch_enabled: false,
            ..Default::default()
        };
        let poller = OutboxPoller::new(repo.clone(), broker, clock, config, Arc::new(NoOpMetricsSink));

        for _ in 0..5 {
            poller.tick().await.unwrap();
        }

        assert_eq!(poller.circuit_state(), crate::circuit_breaker::CircuitState::Open);
        let published = poller.tick().await.unwrap();
        assert_eq!(published, 0, "breaker open, tick should be skipped entirely");
    }

    #[tokio::test]
    async fn row_exceeding_max_retries_becomes_failed_and_stops_retrying() {
        let clock = Arc::new(FakeClock::at(1_700_000_000_000));
        let repo = Arc::new(InMemoryOutboxRepository::new());
        repo.insert_directly(OutboxEvent::new("1", "order", "o-1", "order.created", "{}", clock.now()));
        let broker = Arc::new(ToggleableBroker {
            fail: AtomicBool::new(true),
            calls: AtomicU32::new(0),
        });
        let config = PollerConfig {
            max_retries: 2,
            circuit_breaker_enabled: false,
            ..Default::default()
        };
        let poller = OutboxPoller::new(repo.clone(), broker, clock.clone(), config, Arc::new(NoOpMetricsSink));

        poller.tick().await.unwrap();
        assert_eq!(repo.snapshot()[0].retry_count, 1);

        // advance past this row's next_retry_at so the second tick claims it again
        clock.advance(5_000);
        poller.tick().await.unwrap();

        assert_eq!(repo.snapshot()[0].status, OutboxStatus::Failed);
    }
}
