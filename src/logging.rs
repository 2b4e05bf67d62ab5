//! Logging setup
//!
//! Diagnostics go to stderr so the stdout progress bar and summary stay
//! clean. `RUST_LOG` overrides the level derived from the CLI flags.

use tracing_subscriber::EnvFilter;

pub fn init(debug: bool, quiet: bool) {
    let default_filter = if debug {
        "nzbcheck=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
