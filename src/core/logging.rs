//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` when
//! verbose output is requested.

use crate::core::error::{CoreError, CoreResult};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
pub fn init_logging(verbose: bool) -> CoreResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| CoreError::Logging {
            message: e.to_string(),
        })
}
