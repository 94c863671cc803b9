use crate::sink::MetricsSink;
use prometheus::{IntCounter, IntGauge, Opts};
use tracing::warn;

/// Registers the runtime's counters/gauges to `prometheus::default_registry()`
/// on construction, labeled with `service` so multiple instances sharing a
/// process (tests, multi-tenant embedding) don't collide.
#[derive(Clone)]
pub struct PrometheusMetricsSink {
    publish_success: IntCounter,
    publish_failure: IntCounter,
    dlq_routed: IntCounter,
    file_backup_written: IntCounter,

    outbox_pending: IntGauge,
    outbox_published: IntCounter,
    outbox_failed: IntCounter,
    outbox_oldest_pending_age_seconds: IntGauge,

    ids_generated: IntCounter,
    clock_regressions: IntCounter,

    circuit_breaker_opens: IntCounter,
    circuit_breaker_closes: IntCounter,
}

impl PrometheusMetricsSink {
    pub fn new(service: &str) -> Self {
        let registry = prometheus::default_registry();

        macro_rules! counter {
            ($name:literal, $help:literal) => {{
                let c = IntCounter::with_opts(Opts::new($name, $help).const_label("service", service.to_string()))
                    .expect(concat!("valid metric opts for ", $name));
                if let Err(e) = registry.register(Box::new(c.clone())) {
                    warn!("failed to register metric {}: {}", $name, e);
                }
                c
            }};
        }
        macro_rules! gauge {
            ($name:literal, $help:literal) => {{
                let g = IntGauge::with_opts(Opts::new($name, $help).const_label("service", service.to_string()))
                    .expect(concat!("valid metric opts for ", $name));
                if let Err(e) = registry.register(Box::new(g.clone())) {
                    warn!("failed to register metric {}: {}", $name, e);
                }
                g
            }};
        }

        Self {
            publish_success: counter!("curve_publish_success_total", "Events successfully dispatched to the broker"),
            publish_failure: counter!("curve_publish_failure_total", "Publish attempts that did not reach the broker"),
            dlq_routed: counter!("curve_dlq_routed_total", "Events routed to the dead-letter topic"),
            file_backup_written: counter!("curve_file_backup_written_total", "Events written to on-disk backup"),

            outbox_pending: gauge!("curve_outbox_pending", "Outbox rows currently PENDING"),
            outbox_published: counter!("curve_outbox_published_total", "Outbox rows transitioned to PUBLISHED"),
            outbox_failed: counter!("curve_outbox_failed_total", "Outbox rows transitioned to FAILED"),
            outbox_oldest_pending_age_seconds: gauge!(
                "curve_outbox_oldest_pending_age_seconds",
                "Age in seconds of the oldest PENDING outbox row"
            ),

            ids_generated: counter!("curve_ids_generated_total", "IDs produced by the Snowflake generator"),
            clock_regressions: counter!("curve_clock_regressions_total", "Clock regressions observed by the ID generator"),

            circuit_breaker_opens: counter!("curve_circuit_breaker_opens_total", "Outbox poller circuit breaker transitions to Open"),
            circuit_breaker_closes: counter!("curve_circuit_breaker_closes_total", "Outbox poller circuit breaker transitions to Closed"),
        }
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn record_publish_success(&self) {
        self.publish_success.inc();
    }

    fn record_publish_failure(&self) {
        self.publish_failure.inc();
    }

    fn record_dlq_routed(&self) {
        self.dlq_routed.inc();
    }

    fn record_file_backup_written(&self) {
        self.file_backup_written.inc();
    }

    fn set_outbox_pending(&self, count: i64) {
        self.outbox_pending.set(count);
    }

    fn record_outbox_published(&self) {
        self.outbox_published.inc();
    }

    fn record_outbox_failed(&self) {
        self.outbox_failed.inc();
    }

    fn set_outbox_oldest_pending_age_seconds(&self, age: i64) {
        self.outbox_oldest_pending_age_seconds.set(age);
    }

    fn record_id_generated(&self) {
        self.ids_generated.inc();
    }

    fn record_clock_regression(&self) {
        self.clock_regressions.inc();
    }

    fn record_circuit_breaker_open(&self) {
        self.circuit_breaker_opens.inc();
    }

    fn record_circuit_breaker_close(&self) {
        self.circuit_breaker_closes.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_do_not_panic() {
        let sink = PrometheusMetricsSink::new("curve-test-metrics-sink");
        sink.record_publish_success();
        sink.record_publish_failure();
        sink.record_dlq_routed();
        sink.record_file_backup_written();
        sink.set_outbox_pending(3);
        sink.record_outbox_published();
        sink.record_outbox_failed();
        sink.set_outbox_oldest_pending_age_seconds(42);
        sink.record_id_generated();
        sink.record_clock_regression();
        sink.record_circuit_breaker_open();
        sink.record_circuit_breaker_close();
    }
}
