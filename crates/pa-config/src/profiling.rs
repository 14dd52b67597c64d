//! Profiling endpoints: the built-in catalog and the per-job merge.
//!
//! Every job scrapes a set of named pprof-style endpoints. A job that says
//! nothing about profiling gets the whole catalog; a job that names some
//! endpoints replaces those entries wholesale and inherits the rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Endpoint map keyed by endpoint name (`memory`, `process_cpu`, ...).
pub type PprofConfig = BTreeMap<String, PprofEndpointConfig>;

/// One row of the built-in endpoint catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub enabled: bool,
    pub delta: bool,
    pub path: &'static str,
}

/// Well-known endpoints every job scrapes unless told otherwise.
pub const DEFAULT_CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        name: "memory",
        enabled: true,
        delta: false,
        path: "/debug/pprof/allocs",
    },
    CatalogEntry {
        name: "block",
        enabled: true,
        delta: false,
        path: "/debug/pprof/block",
    },
    CatalogEntry {
        name: "goroutine",
        enabled: true,
        delta: false,
        path: "/debug/pprof/goroutine",
    },
    CatalogEntry {
        name: "mutex",
        enabled: true,
        delta: false,
        path: "/debug/pprof/mutex",
    },
    CatalogEntry {
        name: "process_cpu",
        enabled: true,
        delta: true,
        path: "/debug/pprof/profile",
    },
    CatalogEntry {
        name: "fgprof",
        enabled: true,
        delta: false,
        path: "/debug/fgprof",
    },
];

impl CatalogEntry {
    pub fn to_endpoint(&self) -> PprofEndpointConfig {
        PprofEndpointConfig {
            enabled: Some(self.enabled),
            delta: self.delta,
            path: self.path.to_string(),
        }
    }
}

/// Fresh copy of the catalog as an endpoint map.
pub fn defaults() -> PprofConfig {
    DEFAULT_CATALOG
        .iter()
        .map(|entry| (entry.name.to_string(), entry.to_endpoint()))
        .collect()
}

/// Settings for a single profiling endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PprofEndpointConfig {
    /// `None` means the document did not say; treated as enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Samples cover the time since the previous scrape (CPU profiles).
    #[serde(default)]
    pub delta: bool,

    #[serde(default)]
    pub path: String,
}

impl PprofEndpointConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// A job's `profiling_config` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilingConfig {
    /// Prepended to every endpoint path of the job.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,

    /// A null map or a null entry counts as not written.
    #[serde(default, deserialize_with = "endpoints_skipping_null")]
    pub pprof_config: PprofConfig,
}

fn endpoints_skipping_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<PprofConfig, D::Error> {
    let raw: Option<BTreeMap<String, Option<PprofEndpointConfig>>> =
        Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, endpoint)| endpoint.map(|e| (name, e)))
        .collect())
}

impl ProfilingConfig {
    /// Merge a decoded section against the catalog.
    ///
    /// User entries replace catalog entries of the same name field-for-field
    /// and custom names are carried through. Paths and a non-empty
    /// `path_prefix` are made absolute, then the prefix is prepended to every
    /// entry once. Feeding an already merged config back in prefixes it a
    /// second time.
    pub fn merge(user: Option<ProfilingConfig>) -> ProfilingConfig {
        let Some(user) = user else {
            return ProfilingConfig {
                path_prefix: String::new(),
                pprof_config: defaults(),
            };
        };

        let ProfilingConfig {
            mut path_prefix,
            pprof_config: mut endpoints,
        } = user;
        if !path_prefix.is_empty() && !path_prefix.starts_with('/') {
            path_prefix.insert(0, '/');
        }

        for entry in DEFAULT_CATALOG.iter() {
            endpoints
                .entry(entry.name.to_string())
                .or_insert_with(|| entry.to_endpoint());
        }

        for (name, endpoint) in endpoints.iter_mut() {
            if !endpoint.path.starts_with('/') {
                endpoint.path.insert(0, '/');
            }
            if !path_prefix.is_empty() {
                endpoint.path.insert_str(0, &path_prefix);
                debug!(endpoint = %name, path = %endpoint.path, "applied path prefix");
            }
        }

        ProfilingConfig {
            path_prefix,
            pprof_config: endpoints,
        }
    }

    pub fn endpoint(&self, name: &str) -> Option<&PprofEndpointConfig> {
        self.pprof_config.get(name)
    }

    /// Endpoints a scrape loop should actually pull.
    pub fn enabled_endpoints(&self) -> impl Iterator<Item = (&str, &PprofEndpointConfig)> {
        self.pprof_config
            .iter()
            .filter(|(_, endpoint)| endpoint.is_enabled())
            .map(|(name, endpoint)| (name.as_str(), endpoint))
    }
}
