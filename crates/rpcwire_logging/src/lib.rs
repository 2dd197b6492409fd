//! Shared logging utilities for rpcwire binaries.
//!
//! Libraries only emit `tracing` events; binaries call [`init_logging`]
//! once at startup. `RUST_LOG` overrides the built-in filter.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "rpcwire=info,rpcwire_schema=info,rpcwire_codec=info";
const VERBOSE_LOG_FILTER: &str = "rpcwire=debug,rpcwire_schema=debug,rpcwire_codec=debug";

/// Logging configuration shared by rpcwire binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Initialize tracing with stderr output.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.verbose)));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.verbose)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize logging for {}: {}", config.app_name, err))?;

    tracing::debug!(app = config.app_name, "Logging initialized");
    Ok(())
}
