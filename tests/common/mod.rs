use tracing_subscriber::EnvFilter;

/// Routes library logs to the test output. `RUST_LOG` overrides the default
/// `eoptic=debug` filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eoptic=debug"));
    // Several tests in one binary race to install the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
