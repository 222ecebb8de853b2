//! Diagnostics setup
//!
//! The library only emits `tracing` events (targets under `chat_store`).
//! Binaries call [`init`] once to print them to stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `chat_store=debug`
pub const LOG_ENV: &str = "CHAT_STORE_LOG";

/// Install a stderr subscriber filtered by `CHAT_STORE_LOG` (default `info`).
///
/// Calling it again, or after another subscriber was installed, is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
