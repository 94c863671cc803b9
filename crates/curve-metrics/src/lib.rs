//! Metrics sink abstraction for the publishing runtime.

pub mod prometheus_sink;
pub mod sink;

pub use prometheus_sink::PrometheusMetricsSink;
pub use sink::{MetricsSink, NoOpMetricsSink};
