//! Top-level configuration: decode, normalize, validate.
//!
//! Loading is a straight pipeline: text is decoded strictly, every job gets
//! its defaults and merged profiling endpoints, and the result is an
//! immutable [`Config`]. Validation is a separate step so callers can load a
//! document without storage (for inspection) and still refuse to start on it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::bucket::{Bucket, BucketConfig};
use crate::scrape::{ScrapeConfig, ScrapeConfigDocument};
use crate::validate::{validate_debug_info, ValidationError, ValidationResult};

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "no configuration file found: pass --config-file, set PA_CONFIG or PA_CONFIG_DIR, \
         or install agent.yaml in the XDG or /etc profiling-agent directory"
    )]
    NotFound,

    #[error("cannot decode configuration: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::Io { .. } => 60,
            ConfigError::Decode(_) => 61,
            ConfigError::NotFound => 62,
            ConfigError::Validation(e) => e.code(),
        }
    }
}

/// Where collected debug information is persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebugInfoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<BucketConfig>,
}

/// The document as decoded, before defaulting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(default)]
    pub scrape_configs: Vec<ScrapeConfigDocument>,

    #[serde(default)]
    pub debug_info: Option<DebugInfoConfig>,
}

/// A fully normalized agent configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Config {
    /// Jobs in declaration order. Duplicate names are allowed here.
    pub scrape_configs: Vec<ScrapeConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfoConfig>,
}

impl From<ConfigDocument> for Config {
    fn from(doc: ConfigDocument) -> Self {
        Config {
            scrape_configs: doc
                .scrape_configs
                .into_iter()
                .map(ScrapeConfig::from_document)
                .collect(),
            debug_info: doc.debug_info,
        }
    }
}

impl Config {
    /// Check the storage section. Scrape jobs need no checks once defaulted.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_debug_info(self.debug_info.as_ref()).map(|_| ())
    }

    /// The resolved storage backend.
    pub fn bucket(&self) -> ValidationResult<Bucket> {
        validate_debug_info(self.debug_info.as_ref())
    }

    pub fn job(&self, name: &str) -> Option<&ScrapeConfig> {
        self.scrape_configs.iter().find(|j| j.job_name == name)
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.scrape_configs.iter().map(|j| j.job_name.as_str())
    }
}

/// Decode and normalize a document without validating it.
pub fn load(text: &str) -> Result<Config, ConfigError> {
    let doc: ConfigDocument = serde_yaml::from_str(text)?;
    let config = Config::from(doc);

    info!(
        jobs = config.scrape_configs.len(),
        storage = config
            .debug_info
            .as_ref()
            .and_then(|d| d.bucket.as_ref())
            .and_then(|b| b.kind.as_deref())
            .unwrap_or("none"),
        "loaded configuration"
    );

    Ok(config)
}

/// Decode, normalize, and validate: the startup path.
pub fn load_and_validate(text: &str) -> Result<Config, ConfigError> {
    let config = load(text)?;
    config.validate()?;
    Ok(config)
}

/// Read a file and [`load`] it.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_config_file(path)?;
    load(&text)
}

pub(crate) fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketType;
    use crate::profiling::defaults;

    #[test]
    fn test_load_empty_document() {
        let config = load("{}").unwrap();
        assert!(config.scrape_configs.is_empty());
        assert!(config.debug_info.is_none());
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let err = load("scrape_config: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
        assert_eq!(err.code(), 61);
    }

    #[test]
    fn test_unknown_debug_info_key_rejected() {
        let err = load("debug_info:\n  cache: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        assert!(matches!(
            load("scrape_configs: [").unwrap_err(),
            ConfigError::Decode(_)
        ));
    }

    #[test]
    fn test_load_does_not_validate() {
        let config = load("scrape_configs:\n  - job_name: a\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_and_validate_surfaces_validation_error() {
        let err = load_and_validate("scrape_configs: []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::MissingStorage)
        ));
        assert_eq!(err.code(), 70);
    }

    #[test]
    fn test_bucket_resolves_after_load() {
        let config = load_and_validate(
            "debug_info:\n  bucket:\n    type: FILESYSTEM\n    config:\n      directory: ./tmp\n",
        )
        .unwrap();
        assert_eq!(config.bucket().unwrap().kind(), BucketType::Filesystem);
    }

    #[test]
    fn test_duplicate_job_names_kept_in_order() {
        let config =
            load("scrape_configs:\n  - job_name: a\n  - job_name: b\n  - job_name: a\n").unwrap();
        let names: Vec<&str> = config.job_names().collect();
        assert_eq!(names, ["a", "b", "a"]);
        assert_eq!(config.job("b").unwrap().profiling_config.pprof_config, defaults());
    }

    #[test]
    fn test_null_profiling_values_use_catalog() {
        let config = load(
            "scrape_configs:\n  - job_name: a\n    profiling_config:\n      pprof_config:\n        memory: ~\n  - job_name: b\n    profiling_config:\n      pprof_config: ~\n",
        )
        .unwrap();
        assert_eq!(config.job("a").unwrap().profiling_config.pprof_config, defaults());
        assert_eq!(config.job("b").unwrap().profiling_config.pprof_config, defaults());
    }

    #[test]
    fn test_load_file_missing() {
        let err = load_file(Path::new("/nonexistent/agent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.code(), 60);
    }

    #[test]
    fn test_normalized_config_serializes() {
        let config = load(
            "scrape_configs:\n  - job_name: a\n    static_configs:\n      - targets: ['x:1']\n",
        )
        .unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("job_name: a"));
        assert!(yaml.contains("scrape_interval: 10s"));
        assert!(yaml.contains("/debug/pprof/allocs"));
        assert!(yaml.contains("static_configs"));
    }
}
