//! Diagnostic logging for the action run.
//!
//! Log lines go to stderr so that workflow commands written to stdout
//! (`::error::`, `::warning::`) stay parseable by the runner.

use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `debug` when the workflow
/// was re-run with debug logging (`RUNNER_DEBUG=1`) and `info` in all other cases.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(env::var("RUNNER_DEBUG").ok())));

    // A second init (tests, embedding) is not an error.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

fn default_directive(runner_debug: Option<String>) -> &'static str {
    match runner_debug.as_deref() {
        Some("1") => "debug",
        _ => "info",
    }
}
