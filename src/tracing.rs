//! Tracing utilities for the library

/// Initialize tracing for tests.
/// Only initializes if RUST_ENV is set to "DEBUG"
pub fn init_tracing() {
    if let Ok(env) = std::env::var("RUST_ENV") {
        if env == "DEBUG" {
            let filter = ::tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                |_| ::tracing_subscriber::EnvFilter::new("postgres_testkit=debug,info"),
            );
            let _ = ::tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        }
    }
}
