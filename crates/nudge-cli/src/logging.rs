//! Diagnostics on stderr
//!
//! Filtering follows `RUST_LOG` (for example `RUST_LOG=nudge_core=trace` to
//! see per-column probing). Without it the level is `warn`, or `debug` with
//! `--verbose`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber. stdout is reserved for output.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .with_filter(filter);

    // A subscriber may already be set when embedded in tests
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
