//! Log setup for the binary. The library only emits `tracing` events.

use tracing_subscriber::EnvFilter;

/// Env var holding the log filter, e.g. `hostswitch=debug`.
pub const LOG_ENV: &str = "HOSTSWITCH_LOG";

/// Install a stderr subscriber. Safe to call more than once.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("hostswitch=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
