//! Configuration file discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path → system path.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/profiling-agent/.
    SystemConfig,

    /// No file found.
    #[default]
    NotFound,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::NotFound => write!(f, "not found"),
        }
    }
}

/// A resolved configuration file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "PA_CONFIG";
pub const ENV_CONFIG_DIR: &str = "PA_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "agent.yaml";

/// Application name for XDG and system directories.
const APP_NAME: &str = "profiling-agent";

/// Resolve the agent configuration file.
///
/// 1. Explicit CLI path (returned even when missing, so the caller reports it)
/// 2. `PA_CONFIG` (file path)
/// 3. `PA_CONFIG_DIR` + `agent.yaml`
/// 4. XDG config directory (`~/.config/profiling-agent/agent.yaml`)
/// 5. System config (`/etc/profiling-agent/agent.yaml`)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPath {
    let resolved = resolve_inner(cli_path);
    debug!(
        path = ?resolved.path,
        source = %resolved.source,
        "resolved configuration file"
    );
    resolved
}

fn resolve_inner(cli_path: Option<&Path>) -> ConfigPath {
    let found = |path: PathBuf, source: ConfigSource| ConfigPath {
        path: Some(path),
        source,
    };

    // 1. CLI argument
    if let Some(path) = cli_path {
        return found(path.to_path_buf(), ConfigSource::CliArgument);
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    // 5. System config
    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    ConfigPath::default()
}

/// Get the XDG config directory for the agent.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
