//! Logging setup
//!
//! Library code logs through `tracing`; the binary installs a
//! `tracing-subscriber` formatter writing to stderr, leaving stdout to
//! command output such as `slug`.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given flags: `warn` by default, `info` with
/// `--verbose`, `debug` with `--debug`
pub fn level_directive(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the flags.
pub fn init(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbose, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();
}
