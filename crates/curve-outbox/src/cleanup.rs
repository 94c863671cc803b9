use crate::repository::OutboxRepository;
use curve_clock::Clock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub retention: chrono::Duration,
    pub batch_limit: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::days(30),
            batch_limit: 1000,
        }
    }
}

/// Retention-based deletion of PUBLISHED rows (§4.5). Scheduling
/// (`cleanupCron`, default `0 0 2 * * *`) is left to the operator's
/// process supervisor; this type only knows how to run one sweep.
pub struct OutboxCleanup<R: OutboxRepository, C: Clock> {
    repository: Arc<R>,
    clock: Arc<C>,
    config: CleanupConfig,
}

impl<R: OutboxRepository, C: Clock> OutboxCleanup<R, C> {
    pub fn new(repository: Arc<R>, clock: Arc<C>, config: CleanupConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Deletes PUBLISHED rows older than the retention window in batches
    /// of `batch_limit`, looping until a pass deletes fewer than the
    /// limit. Returns the total rows deleted.
    pub async fn run_once(&self) -> Result<u64, crate::error::OutboxError> {
        let cutoff = self.clock.now() - self.config.retention;
        let mut total = 0u64;
        loop {
            let deleted = self.repository.delete_published_before(cutoff, self.config.batch_limit).await?;
            total += deleted;
            if deleted < self.config.batch_limit as u64 {
                break;
            }
        }
        if total > 0 {
            tracing::info!(deleted = total, "outbox cleanup removed published rows past retention");
        }
        Ok(total)
    }

    /// Runs `run_once` on a fixed interval. A real cron schedule
    /// (`cleanupCron`) is the operator's job; this is the simple
    /// always-on fallback for services that don't wire their own
    /// scheduler.
    pub async fn run_periodically(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "outbox cleanup sweep failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OutboxEvent, OutboxStatus};
    use crate::testing::InMemoryOutboxRepository;
    use curve_clock::FakeClock;

    #[tokio::test]
    async fn deletes_only_published_rows_past_retention() {
        let clock = Arc::new(FakeClock::at(1_700_000_000_000));
        let repo = Arc::new(InMemoryOutboxRepository::new());

        let mut old_published = OutboxEvent::new("1", "order", "o-1", "order.created", "{}", clock.now() - chrono::Duration::days(40));
        old_published.status = OutboxStatus::Published;
        repo.insert_directly(old_published);

        let mut recent_published = OutboxEvent::new("2", "order", "o-2", "order.created", "{}", clock.now());
        recent_published.status = OutboxStatus::Published;
        repo.insert_directly(recent_published);

        repo.insert_directly(OutboxEvent::new(
            "3",
            "order",
            "o-3",
            "order.created",
            "{}",
            clock.now() - chrono::Duration::days(40),
        ));

        let cleanup = OutboxCleanup::new(repo.clone(), clock, CleanupConfig::default());
        let deleted = cleanup.run_once().await.unwrap();

        assert_eq!(deleted, 1);
        let remaining: Vec<_> = repo.snapshot().iter().map(|e| e.event_id.clone()).collect();
        assert_eq!(remaining, vec!["2".to_string(), "3".to_string()]);
    }
}
