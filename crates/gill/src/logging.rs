//! Logging initialization.
//!
//! Logs always go to stderr: the language server owns stdout for JSON-RPC.
//!
//! The filter is taken from `GILL_LOG`, then `RUST_LOG`, defaulting to
//! `warn` (`debug` with `--verbose`):
//! - `GILL_LOG=debug` - every tool invocation and its exit code
//! - `GILL_LOG=gill::serve=trace` - language server events only

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "GILL_LOG";

/// Build the filter directive from the environment.
fn filter_directive(verbose: bool) -> String {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| if verbose { "debug" } else { "warn" }.to_string())
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_new(filter_directive(verbose))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .compact()
        .try_init();
}
