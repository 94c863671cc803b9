use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an [`OutboxEvent`] row (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutboxStatus {
    Pending,
    Published,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Published => "PUBLISHED",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(OutboxStatus::Pending),
            "PUBLISHED" => Some(OutboxStatus::Published),
            "FAILED" => Some(OutboxStatus::Failed),
            _ => None,
        }
    }
}

/// A row co-transacted with business state (§4.5), drained asynchronously
/// to the broker by the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub event_id: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: String,
    pub occurred_at: DateTime<Utc>,
    pub status: OutboxStatus,
    pub retry_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl OutboxEvent {
    /// Build a new PENDING row, stamped with `now` per §4.5's write path
    /// (`nextRetryAt = now`, `createdAt = updatedAt = occurredAt = now`).
    pub fn new(
        event_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            event_type: event_type.into(),
            payload: payload.into(),
            occurred_at: now,
            status: OutboxStatus::Pending,
            retry_count: 0,
            published_at: None,
            error_message: None,
            next_retry_at: Some(now),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Error message truncation applied before storing `error_message`
/// (§4.5 step 6: "truncate(cause, 500)").
pub fn truncate_error(message: &str, max_len: usize) -> String {
    if message.len() <= max_len {
        message.to_string()
    } else {
        message.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_pending_with_matching_timestamps() {
        let now = Utc::now();
        let event = OutboxEvent::new("1", "order", "o-1", "order.created", "{}", now);
        assert_eq!(event.status, OutboxStatus::Pending);
        assert_eq!(event.retry_count, 0);
        assert_eq!(event.occurred_at, now);
        assert_eq!(event.created_at, now);
        assert_eq!(event.updated_at, now);
        assert_eq!(event.next_retry_at, Some(now));
    }

    #[test]
    fn status_round_trips_through_string() {
        for status in [OutboxStatus::Pending, OutboxStatus::Published, OutboxStatus::Failed] {
            assert_eq!(OutboxStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn truncate_error_caps_length() {
        let long = "x".repeat(600);
        assert_eq!(truncate_error(&long, 500).len(), 500);
        assert_eq!(truncate_error("short", 500), "short");
    }
}
