//! Telemetry helpers for structured logging and tracing.

/// Install a default env-filtered fmt subscriber unless the embedding process
/// already set one. Defaults to `info` when `RUST_LOG` is unset.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
