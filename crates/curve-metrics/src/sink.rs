/// Everything the runtime reports about its own health. Default
/// wiring uses [`crate::NoOpMetricsSink`]; production wiring swaps in
/// [`crate::PrometheusMetricsSink`].
pub trait MetricsSink: Send + Sync {
    fn record_publish_success(&self) {}
    fn record_publish_failure(&self) {}
    fn record_dlq_routed(&self) {}
    fn record_file_backup_written(&self) {}

    fn set_outbox_pending(&self, _count: i64) {}
    fn record_outbox_published(&self) {}
    fn record_outbox_failed(&self) {}
    fn set_outbox_oldest_pending_age_seconds(&self, _age: i64) {}

    fn record_id_generated(&self) {}
    fn record_clock_regression(&self) {}

    fn record_circuit_breaker_open(&self) {}
    fn record_circuit_breaker_close(&self) {}
}

/// Discards everything. Used when no metrics backend is configured, so
/// callers never need to check "is metrics enabled" before recording.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMetricsSink;

impl MetricsSink for NoOpMetricsSink {}
