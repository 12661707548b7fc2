//! Diagnostic tracing for replo itself.
//!
//! Tracing goes to stderr and is filtered by `RUST_LOG`. It never reaches the
//! program output stream, and `--debug` output (the staged source) does not
//! go through it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Without `RUST_LOG` only warnings show,
/// e.g. a failed formatter or history write.
///
/// ```bash
/// RUST_LOG=replo=debug replo --skip-history
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
