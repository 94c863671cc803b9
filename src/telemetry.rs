//! Logging setup, scoped down from Nova's full `ObservabilityConfig` to
//! just the part this library owns: level and per-module filters. Trace
//! export, metrics export, health endpoints and profiling are framework
//! auto-configuration concerns outside this crate's scope.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing_subscriber::fmt` subscriber with an
/// `EnvFilter` built from `filter`, or `info` if `filter` is empty.
/// Call once at process startup; a second call is a no-op (the
/// underlying `set_global_default` error is swallowed, matching
/// `resilience`'s "best effort, don't panic on double-init" stance for
/// ambient setup).
pub fn init(filter: &str) {
    let filter = if filter.is_empty() { "info" } else { filter };
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

/// Convenience wrapper over [`init`] that reads `RUST_LOG`, falling back
/// to `info` when unset.
pub fn init_from_env() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    init(&filter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic_on_repeated_calls() {
        init("info");
        init("debug");
    }
}
