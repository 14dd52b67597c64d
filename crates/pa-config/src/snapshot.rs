//! Configuration snapshots for audit logs and reload comparison.
//!
//! A snapshot records which document was loaded and what it amounts to,
//! without holding on to the configuration itself. A host that reloads can
//! compare digests and skip the swap when nothing changed.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::resolve::ConfigSource;

/// A frozen description of one configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// SHA-256 of the raw document text.
    pub content_hash: String,

    /// Path the document was read from.
    #[serde(default)]
    pub path: Option<String>,

    /// How the path was found.
    pub source: String,

    /// Key values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    /// Job names in declaration order.
    pub jobs: Vec<String>,

    /// Endpoints across all jobs.
    pub endpoints: usize,

    /// Endpoints a scrape loop would pull.
    pub enabled_endpoints: usize,

    /// Storage backend type tag as written, if any.
    #[serde(default)]
    pub storage_backend: Option<String>,
}

impl ConfigSnapshot {
    pub fn new(config: &Config, raw: &str, path: Option<&Path>, source: ConfigSource) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            content_hash: hash_content(raw),
            path: path.map(|p| p.display().to_string()),
            source: source.to_string(),
            summary: ConfigSummary::of(config),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Same document text as `other`.
    pub fn same_content(&self, other: &ConfigSnapshot) -> bool {
        self.content_hash == other.content_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.content_hash[..12.min(self.content_hash.len())]
    }
}

impl ConfigSummary {
    pub fn of(config: &Config) -> Self {
        let profiling = config.scrape_configs.iter().map(|j| &j.profiling_config);
        ConfigSummary {
            jobs: config.job_names().map(str::to_string).collect(),
            endpoints: profiling.clone().map(|p| p.pprof_config.len()).sum(),
            enabled_endpoints: profiling.map(|p| p.enabled_endpoints().count()).sum(),
            storage_backend: config
                .debug_info
                .as_ref()
                .and_then(|d| d.bucket.as_ref())
                .and_then(|b| b.kind.clone()),
        }
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load;

    const DOC: &str = r#"
scrape_configs:
  - job_name: a
    profiling_config:
      pprof_config:
        fgprof:
          enabled: false
          path: /debug/fgprof
  - job_name: b
debug_info:
  bucket:
    type: FILESYSTEM
    config:
      directory: ./data
"#;

    #[test]
    fn test_summary_counts() {
        let config = load(DOC).unwrap();
        let summary = ConfigSummary::of(&config);
        assert_eq!(summary.jobs, ["a", "b"]);
        assert_eq!(summary.endpoints, 12);
        assert_eq!(summary.enabled_endpoints, 11);
        assert_eq!(summary.storage_backend.as_deref(), Some("FILESYSTEM"));
    }

    #[test]
    fn test_same_content() {
        let config = load(DOC).unwrap();
        let s1 = ConfigSnapshot::new(&config, DOC, None, ConfigSource::CliArgument);
        let s2 = ConfigSnapshot::new(&config, DOC, None, ConfigSource::Environment);
        assert!(s1.same_content(&s2));

        let other = format!("{}\n# edited\n", DOC);
        let s3 = ConfigSnapshot::new(&config, &other, None, ConfigSource::CliArgument);
        assert!(!s1.same_content(&s3));
    }

    #[test]
    fn test_snapshot_short_id() {
        let config = load(DOC).unwrap();
        let snapshot = ConfigSnapshot::new(&config, DOC, None, ConfigSource::CliArgument);
        assert_eq!(snapshot.short_id().len(), 12);
    }

    #[test]
    fn test_hash_content() {
        let hash1 = hash_content("test");
        let hash2 = hash_content("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex chars
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let config = load(DOC).unwrap();
        let snapshot = ConfigSnapshot::new(
            &config,
            DOC,
            Some(Path::new("/etc/profiling-agent/agent.yaml")),
            ConfigSource::SystemConfig,
        );
        let json = snapshot.to_json().unwrap();
        let restored = ConfigSnapshot::from_json(&json).unwrap();
        assert!(snapshot.same_content(&restored));
        assert_eq!(restored.source, "system config");
        assert_eq!(restored.summary, snapshot.summary);
    }
}
