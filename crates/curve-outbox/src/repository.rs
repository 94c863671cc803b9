use crate::error::OutboxError;
use crate::model::{OutboxEvent, OutboxStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

/// Storage for outbox rows (§4.5). `insert` must run inside the caller's
/// transaction so the row commits atomically with business state; every
/// other method operates outside any caller transaction since the poller
/// and cleanup job own their own.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, event: &OutboxEvent) -> Result<(), OutboxError>;

    /// `SELECT ... WHERE status = PENDING AND nextRetryAt <= now ORDER BY
    /// occurredAt ASC LIMIT limit FOR UPDATE SKIP LOCKED`, committed as one
    /// batch by the caller once every row in it has been processed.
    async fn claim_batch(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboxEvent>, OutboxError>;

    async fn mark_published(&self, event_id: &str, now: DateTime<Utc>) -> Result<(), OutboxError>;

    async fn mark_failed(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
        next_retry_at: DateTime<Utc>,
        error_message: &str,
        max_retries: i32,
    ) -> Result<(), OutboxError>;

    async fn pending_count(&self) -> Result<i64, OutboxError>;

    async fn oldest_pending_age_seconds(&self, now: DateTime<Utc>) -> Result<i64, OutboxError>;

    /// Deletes up to `limit` PUBLISHED rows older than `cutoff`, returning
    /// how many were actually deleted (the cleanup job loops on this until
    /// it drops below `limit`, per §4.5).
    async fn delete_published_before(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<u64, OutboxError>;
}

pub struct SqlxOutboxRepository {
    pool: PgPool,
}

impl SqlxOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `CREATE TABLE IF NOT EXISTS` matching the §6 table layout, used by
    /// schema-initialization mode `ALWAYS`.
    pub async fn initialize_schema(&self) -> Result<(), OutboxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS curve_outbox_events (
                event_id       VARCHAR(64) PRIMARY KEY,
                aggregate_type VARCHAR(100) NOT NULL,
                aggregate_id   VARCHAR(100) NOT NULL,
                event_type     VARCHAR(100) NOT NULL,
                payload        TEXT NOT NULL,
                occurred_at    TIMESTAMPTZ NOT NULL,
                status         VARCHAR(20) NOT NULL,
                retry_count    INT NOT NULL DEFAULT 0,
                published_at   TIMESTAMPTZ NULL,
                error_message  VARCHAR(500) NULL,
                next_retry_at  TIMESTAMPTZ NULL,
                created_at     TIMESTAMPTZ NOT NULL,
                updated_at     TIMESTAMPTZ NOT NULL,
                version        BIGINT NULL
            );
            CREATE INDEX IF NOT EXISTS curve_outbox_events_status_idx ON curve_outbox_events (status);
            CREATE INDEX IF NOT EXISTS curve_outbox_events_aggregate_idx ON curve_outbox_events (aggregate_type, aggregate_id);
            CREATE INDEX IF NOT EXISTS curve_outbox_events_occurred_at_idx ON curve_outbox_events (occurred_at);
            CREATE INDEX IF NOT EXISTS curve_outbox_events_next_retry_at_idx ON curve_outbox_events (next_retry_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OutboxRepository for SqlxOutboxRepository {
    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, event: &OutboxEvent) -> Result<(), OutboxError> {
        sqlx::query(
            r#"
            INSERT INTO curve_outbox_events (
                event_id, aggregate_type, aggregate_id, event_type, payload,
                occurred_at, status, retry_count, published_at, error_message,
                next_retry_at, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&event.event_id)
        .bind(&event.aggregate_type)
        .bind(&event.aggregate_id)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.occurred_at)
        .bind(event.status.as_str())
        .bind(event.retry_count)
        .bind(event.published_at)
        .bind(&event.error_message)
        .bind(event.next_retry_at)
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(event.version)
        .execute(&mut **tx)
        .await?;

        tracing::debug!(event_id = %event.event_id, event_type = %event.event_type, "outbox event inserted");
        Ok(())
    }

    async fn claim_batch(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OutboxEvent>, OutboxError> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, aggregate_type, aggregate_id, event_type, payload,
                   occurred_at, status, retry_count, published_at, error_message,
                   next_retry_at, created_at, updated_at, version
            FROM curve_outbox_events
            WHERE status = 'PENDING' AND next_retry_at <= $1
            ORDER BY occurred_at ASC
            LIMIT $2
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_event).collect()
    }

    async fn mark_published(&self, event_id: &str, now: DateTime<Utc>) -> Result<(), OutboxError> {
        let result = sqlx::query(
            r#"
            UPDATE curve_outbox_events
            SET status = 'PUBLISHED', published_at = $2, updated_at = $2, version = version + 1
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::NotFound(event_id.to_string()));
        }
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
        let truncated = crate::model::truncate_error(error_message, 500);
        let result = sqlx::query(
            r#"
            UPDATE curve_outbox_events
            SET retry_count = retry_count + 1,
                updated_at = $2,
                error_message = $3,
                next_retry_at = $4,
                status = CASE WHEN retry_count + 1 >= $5 THEN 'FAILED' ELSE status END,
                version = version + 1
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(now)
        .bind(truncated)
        .bind(next_retry_at)
        .bind(max_retries)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::NotFound(event_id.to_string()));
        }
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, OutboxError> {
        let row = sqlx::query("SELECT COUNT(*)::BIGINT AS count FROM curve_outbox_events WHERE status = 'PENDING'")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn oldest_pending_age_seconds(&self, now: DateTime<Utc>) -> Result<i64, OutboxError> {
        let row = sqlx::query(
            r#"
            SELECT EXTRACT(EPOCH FROM ($1 - MIN(occurred_at)))::BIGINT AS age
            FROM curve_outbox_events
            WHERE status = 'PENDING'
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<Option<i64>, _>("age")?.unwrap_or(0))
    }

    async fn delete_published_before(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<u64, OutboxError> {
        let result = sqlx::query(
            r#"
            DELETE FROM curve_outbox_events
            WHERE event_id IN (
                SELECT event_id FROM curve_outbox_events
                WHERE status = 'PUBLISHED' AND occurred_at < $1
                LIMIT $2
            )
            "#,
        )
        .bind(cutoff)
        .bind(limit)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_event(row: sqlx::postgres::PgRow) -> Result<OutboxEvent, OutboxError> {
    let status_raw: String = row.try_get("status")?;
    Ok(OutboxEvent {
        event_id: row.try_get("event_id")?,
        aggregate_type: row.try_get("aggregate_type")?,
        aggregate_id: row.try_get("aggregate_id")?,
        event_type: row.try_get("event_type")?,
        payload: row.try_get("payload")?,
        occurred_at: row.try_get("occurred_at")?,
        status: OutboxStatus::parse(&status_raw).unwrap_or(OutboxStatus::Pending),
        retry_count: row.try_get("retry_count")?,
        published_at: row.try_get("published_at")?,
        error_message: row.try_get("error_message")?,
        next_retry_at: row.try_get("next_retry_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}
