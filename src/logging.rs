//! Logging configuration and initialization
//!
//! Logs are written to stderr so that stdout carries nothing but the winning
//! city. `RUST_LOG` takes precedence over the verbosity flag.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Maps the `-v` count to a default filter directive
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing for the application
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 2)
        .init();

    debug!("Sunrank started with verbosity level: {}", verbose);
}
