//! An in-memory [`OutboxRepository`] so poller and cleanup semantics can
//! be exercised one tick at a time without a real Postgres instance,
//! mirroring how the teacher's resilience crate drives its state
//! machines from outside the crate in a dedicated integration test.

use crate::error::OutboxError;
use crate::model::{OutboxEvent, OutboxStatus};
use crate::repository::OutboxRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::{Postgres, Transaction};

#[derive(Default)]
pub struct InMemoryOutboxRepository {
    rows: Mutex<Vec<OutboxEvent>>,
}

impl InMemoryOutboxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypasses the transactional `insert` for tests that don't have a
    /// real database connection to open a `Transaction` against.
    pub fn insert_directly(&self, event: OutboxEvent) {
        self.rows.lock().push(event);
    }

    pub fn snapshot(&self) -> Vec<OutboxEvent> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl OutboxRepository for InMemoryOutboxRepository {
    async fn insert(&self, _tx: &mut Transaction<'_, Postgres>, event: &OutboxEvent) -> Result<(), OutboxError> {
        self.rows.lock().push(event.clone());
        Ok(())
    }

    async fn claim_batch(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboxEvent>, OutboxError> {
        let rows = self.rows.lock();
        let mut claimed: Vec<OutboxEvent> = rows
            .iter()
            .filter(|e| e.status == OutboxStatus::Pending && e.next_retry_at.map(|t| t <= now).unwrap_or(true))
            .cloned()
            .collect();
        claimed.sort_by_key(|e| e.occurred_at);
        claimed.truncate(limit.max(0) as usize);
        Ok(claimed)
    }

    async fn mark_published(&self, event_id: &str, now: DateTime<Utc>) -> Result<(), OutboxError> {
        let mut rows = self.rows.lock();
        let event = rows
            .iter_mut()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| OutboxError::NotFound(event_id.to_string()))?;
        event.status = OutboxStatus::Published;
        event.published_at = Some(now);
        event.updated_at = now;
        event.version += 1;
        Ok(())
    }

    async fn mark_failed(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
        next_retry_at: DateTime<Utc>,
        error_message: &str,
        max_retries: i32,
    ) -> Result<(), OutboxError> {
        let mut rows = self.rows.lock();
        let event = rows
            .iter_mut()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| OutboxError::NotFound(event_id.to_string()))?;
        event.retry_count += 1;
        event.updated_at = now;
        event.error_message = Some(crate::model::truncate_error(error_message, 500));
        event.next_retry_at = Some(next_retry_at);
        if event.retry_count >= max_retries {
            event.status = OutboxStatus::Failed;
        }
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, OutboxError> {
        Ok(self.rows.lock().iter().filter(|e| e.status == OutboxStatus::Pending).count() as i64)
    }

    async fn oldest_pending_age_seconds(&self, now: DateTime<Utc>) -> Result<i64, OutboxError> {
        let rows = self.rows.lock();
        let oldest = rows
            .iter()
            .filter(|e| e.status == OutboxStatus::Pending)
            .map(|e| e.occurred_at)
            .min();
        Ok(oldest.map(|t| (now - t).num_seconds().max(0)).unwrap_or(0))
    }

    async fn delete_published_before(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<u64, OutboxError> {
        let mut rows = self.rows.lock();
        let mut deleted = 0u64;
        let mut i = 0;
        while i < rows.len() && (deleted as i64) < limit {
            if rows[i].status == OutboxStatus::Published && rows[i].occurred_at < cutoff {
                rows.remove(i);
                deleted += 1;
            } else {
                i += 1;
            }
        }
        Ok(deleted)
    }
}
