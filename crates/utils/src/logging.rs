//! Tracing setup for hosts embedding the editor core.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Initialize the global tracing subscriber. `RUST_LOG` picks the level for
/// our crates; everything else stays at `warn`. Safe to call more than once
/// (later calls are no-ops).
pub fn init() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,utils={level},executors={level},assistant={level},dispatch={level}",
        level = log_level
    );
    let env_filter =
        EnvFilter::try_new(filter_string).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init();
}
