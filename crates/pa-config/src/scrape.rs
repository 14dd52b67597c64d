//! Scrape jobs: decoded form, scalar defaults, and discovery pass-through.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::duration::Duration;
use crate::profiling::ProfilingConfig;

pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SCHEME: &str = "http";

/// Label carrying a target's network address.
pub const ADDRESS_LABEL: &str = "__address__";

/// A set of label name/value pairs.
pub type LabelSet = BTreeMap<String, String>;

/// One scrape job as written in the document.
///
/// Scalars the assembler defaults stay optional here so "absent" can be told
/// apart from an explicit value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeConfigDocument {
    #[serde(deserialize_with = "non_empty_string")]
    pub job_name: String,

    #[serde(default)]
    pub scrape_interval: Option<Duration>,

    #[serde(default)]
    pub scrape_timeout: Option<Duration>,

    #[serde(default)]
    pub scheme: Option<String>,

    #[serde(default)]
    pub profiling_config: Option<ProfilingConfig>,

    #[serde(default)]
    pub static_configs: Vec<StaticConfig>,

    #[serde(default)]
    pub file_sd_configs: Vec<serde_yaml::Value>,

    #[serde(default)]
    pub dns_sd_configs: Vec<serde_yaml::Value>,

    #[serde(default)]
    pub kubernetes_sd_configs: Vec<serde_yaml::Value>,

    #[serde(default)]
    pub consul_sd_configs: Vec<serde_yaml::Value>,
}

fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("job_name is empty"));
    }
    Ok(s)
}

/// A fixed list of targets sharing a label set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticConfig {
    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: LabelSet,
}

/// Targets handed to the discovery subsystem, one group per static config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    pub targets: Vec<LabelSet>,
    pub labels: LabelSet,
    pub source: String,
}

/// Service discovery sections of a job, carried through verbatim.
///
/// Only `static_configs` is typed. The other mechanisms belong to the
/// discovery subsystem and are kept as raw YAML.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ServiceDiscoveryConfigs {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_configs: Vec<StaticConfig>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_sd_configs: Vec<serde_yaml::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_sd_configs: Vec<serde_yaml::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kubernetes_sd_configs: Vec<serde_yaml::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consul_sd_configs: Vec<serde_yaml::Value>,
}

impl ServiceDiscoveryConfigs {
    pub fn is_empty(&self) -> bool {
        self.static_configs.is_empty()
            && self.file_sd_configs.is_empty()
            && self.dns_sd_configs.is_empty()
            && self.kubernetes_sd_configs.is_empty()
            && self.consul_sd_configs.is_empty()
    }

    /// Expand static configs into target groups.
    ///
    /// Each target becomes `{__address__: target}`; a group's source is the
    /// index of its static config.
    pub fn static_target_groups(&self) -> Vec<TargetGroup> {
        self.static_configs
            .iter()
            .enumerate()
            .map(|(i, sc)| TargetGroup {
                targets: sc
                    .targets
                    .iter()
                    .map(|t| LabelSet::from([(ADDRESS_LABEL.to_string(), t.clone())]))
                    .collect(),
                labels: sc.labels.clone(),
                source: i.to_string(),
            })
            .collect()
    }
}

/// A fully defaulted scrape job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeConfig {
    pub job_name: String,
    pub scrape_interval: Duration,
    pub scrape_timeout: Duration,
    pub scheme: String,
    pub profiling_config: ProfilingConfig,

    #[serde(flatten)]
    pub service_discovery: ServiceDiscoveryConfigs,
}

impl ScrapeConfig {
    /// A job with every default applied and no discovery configured.
    pub fn with_defaults(job_name: impl Into<String>) -> Self {
        ScrapeConfig {
            job_name: job_name.into(),
            scrape_interval: DEFAULT_SCRAPE_INTERVAL,
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
            scheme: DEFAULT_SCHEME.to_string(),
            profiling_config: ProfilingConfig::merge(None),
            service_discovery: ServiceDiscoveryConfigs::default(),
        }
    }

    /// Apply scalar defaults and merge the profiling section.
    ///
    /// Timeout is not checked against interval.
    pub fn from_document(doc: ScrapeConfigDocument) -> Self {
        let ScrapeConfigDocument {
            job_name,
            scrape_interval,
            scrape_timeout,
            scheme,
            profiling_config,
            static_configs,
            file_sd_configs,
            dns_sd_configs,
            kubernetes_sd_configs,
            consul_sd_configs,
        } = doc;

        let service_discovery = ServiceDiscoveryConfigs {
            static_configs,
            file_sd_configs,
            dns_sd_configs,
            kubernetes_sd_configs,
            consul_sd_configs,
        };
        if service_discovery.is_empty() {
            warn!(job = %job_name, "scrape job has no service discovery configured");
        }

        let had_profiling = profiling_config.is_some();
        let config = ScrapeConfig {
            scrape_interval: scrape_interval.unwrap_or(DEFAULT_SCRAPE_INTERVAL),
            scrape_timeout: scrape_timeout.unwrap_or(DEFAULT_SCRAPE_TIMEOUT),
            scheme: scheme.unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            profiling_config: ProfilingConfig::merge(profiling_config),
            service_discovery,
            job_name,
        };

        debug!(
            job = %config.job_name,
            interval = %config.scrape_interval,
            timeout = %config.scrape_timeout,
            scheme = %config.scheme,
            endpoints = config.profiling_config.pprof_config.len(),
            profiling_section = had_profiling,
            "assembled scrape job"
        );

        config
    }
}
