//! Logging infrastructure for the caffeine monitor.
//!
//! Provides centralized tracing setup for the binary.

use crate::journal::ActivityLog;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Initialize logging and mirror INFO and above into the activity log
///
/// Journal lines are plain `LEVEL message`, with no timestamps or colour,
/// since every merge message already carries its own timestamp.
pub fn init_with_journal(default_level: &str, journal: ActivityLog) {
    let journal_layer = fmt::layer()
        .with_writer(Mutex::new(journal))
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(stderr_layer(default_level))
        .with(journal_layer)
        .init();
}

fn stderr_layer<S>(default_level: &str) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(filter)
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
