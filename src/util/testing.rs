//! Shared test setup: one global tracing subscriber writing through the test harness.

use std::sync::Once;

use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Idempotent; call at the top of any test that wants log output.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        tracing::info!("test logging initialized");
    });
}

fn setup_test_logging() {
    // RUST_LOG wins; otherwise everything at debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let quiet_walkdir = filter_fn(|metadata| !metadata.target().starts_with("walkdir"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(quiet_walkdir)
            .with_filter(env_filter),
    );

    // Another harness may already own the global dispatcher
    if let Err(e) = subscriber.try_init() {
        eprintln!("test logging not installed: {}", e);
    }
}
