// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at `info`, or at `debug`
/// when the run was started with `--debug`; dependencies stay at `warn` so
/// reqwest/hyper connection chatter does not drown the scrape progress.
pub fn setup_logging(verbose: bool) {
    let default_directives = if verbose {
        "warn,gas_prices=debug"
    } else {
        "warn,gas_prices=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete ({}).", default_directives);
}
