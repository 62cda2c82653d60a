//! Shared configuration and process setup for Skycast.

pub mod config;

pub use config::{
    CacheConfig, Config, ConfigValidationError, HttpConfig, UpstreamConfig, ValidationResult,
};

use anyhow::Result;

/// Initialize process-wide logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Skycast core initialized");
    Ok(())
}
