//! Log output for embedding applications.
//!
//! Domain and storage code log through the `log` macros. `init` installs a
//! `tracing` fmt subscriber that also picks those records up, filtered by
//! `RUST_LOG` and defaulting to `info`.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn init() -> Result<()> {
    init_with_default(Level::INFO)
}

/// Install the subscriber with `default_level` for targets `RUST_LOG` leaves unset.
/// Fails if a global subscriber or logger is already installed.
pub fn init_with_default(default_level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))?;

    tracing::debug!("Logging initialised at {}", default_level);
    Ok(())
}
