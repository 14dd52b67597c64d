//! Profiling agent configuration loading and validation.
//!
//! This crate provides:
//! - Typed structs for the agent document (scrape jobs, debug-info storage)
//! - The built-in profiling endpoint catalog and per-job merge
//! - Storage descriptor validation, resolving to a typed [`Bucket`]
//! - Config file resolution (CLI → env → XDG → /etc)
//! - Config snapshots for audit and reload comparison

pub mod bucket;
pub mod config;
pub mod duration;
pub mod profiling;
pub mod resolve;
pub mod scrape;
pub mod snapshot;
pub mod validate;

pub use bucket::{BackendError, Bucket, BucketConfig, BucketType};
pub use config::{load, load_and_validate, load_file, Config, ConfigError, DebugInfoConfig};
pub use duration::Duration;
pub use profiling::{defaults, PprofConfig, PprofEndpointConfig, ProfilingConfig};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use scrape::{ScrapeConfig, ServiceDiscoveryConfigs, StaticConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// A validated configuration together with its snapshot.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub snapshot: ConfigSnapshot,
}

/// Read, normalize, and validate the file at `resolved`.
///
/// Fails with [`ConfigError::NotFound`] when resolution found no file.
pub fn load_resolved(resolved: &ConfigPath) -> Result<LoadedConfig, ConfigError> {
    let path = resolved.path.as_deref().ok_or(ConfigError::NotFound)?;
    let text = config::read_config_file(path)?;
    let config = load_and_validate(&text)?;
    let snapshot = ConfigSnapshot::new(&config, &text, Some(path), resolved.source);
    Ok(LoadedConfig { config, snapshot })
}
