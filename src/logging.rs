//! Tracing setup for the command-line tool.
//!
//! The subscriber is only installed when `INTRODUCE_LOG` (or `RUST_LOG`) is
//! set, e.g. `INTRODUCE_LOG=introduce_variable=debug introduce extract ...`.
//! Output goes to stderr so it never mixes with diffs printed on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "INTRODUCE_LOG";

/// Build an `EnvFilter` from `INTRODUCE_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Initialise the global tracing subscriber. Does nothing when neither
/// variable is set.
pub fn init_tracing() {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
