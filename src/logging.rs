//! Log output for the command-line tools.

use tracing_subscriber::EnvFilter;

/// Default filter level for a `-v` count.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Send logs to stderr.  `RUST_LOG` overrides the level picked by `verbose`.
pub fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose))))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
