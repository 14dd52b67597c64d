//! Property-based tests for the profiling endpoint merge.

use pa_config::profiling::DEFAULT_CATALOG;
use pa_config::{defaults, PprofConfig, PprofEndpointConfig, ProfilingConfig};
use proptest::prelude::*;

fn catalog_names() -> Vec<&'static str> {
    DEFAULT_CATALOG.iter().map(|e| e.name).collect()
}

/// Prefixes with and without a leading slash.
fn arb_prefix() -> impl Strategy<Value = String> {
    "/?[a-z0-9_-]{1,8}(/[a-z0-9_-]{1,8}){0,2}"
}

fn absolute(prefix: &str) -> String {
    if prefix.starts_with('/') {
        prefix.to_string()
    } else {
        format!("/{}", prefix)
    }
}

fn arb_endpoint() -> impl Strategy<Value = PprofEndpointConfig> {
    (
        proptest::option::of(any::<bool>()),
        any::<bool>(),
        "(/[a-z0-9_]{1,10}){1,4}",
    )
        .prop_map(|(enabled, delta, path)| PprofEndpointConfig {
            enabled,
            delta,
            path,
        })
}

/// User sections mixing catalog names and custom names.
fn arb_user_endpoints() -> impl Strategy<Value = PprofConfig> {
    let name = prop_oneof![
        proptest::sample::select(catalog_names()).prop_map(str::to_string),
        "custom_[a-z]{1,6}",
    ];
    proptest::collection::btree_map(name, arb_endpoint(), 0..8)
}

proptest! {
    #[test]
    fn prefix_applied_exactly_once(prefix in arb_prefix(), user in arb_user_endpoints()) {
        let unprefixed = ProfilingConfig::merge(Some(ProfilingConfig {
            path_prefix: String::new(),
            pprof_config: user.clone(),
        }));
        let prefixed = ProfilingConfig::merge(Some(ProfilingConfig {
            path_prefix: prefix.clone(),
            pprof_config: user,
        }));

        prop_assert_eq!(unprefixed.pprof_config.len(), prefixed.pprof_config.len());
        for (name, endpoint) in &prefixed.pprof_config {
            let original = &unprefixed.pprof_config[name];
            prop_assert_eq!(
                &endpoint.path,
                &format!("{}{}", absolute(&prefix), original.path)
            );
            prop_assert_eq!(endpoint.enabled, original.enabled);
            prop_assert_eq!(endpoint.delta, original.delta);
        }
    }

    #[test]
    fn user_entries_replace_and_others_default(user in arb_user_endpoints()) {
        let merged = ProfilingConfig::merge(Some(ProfilingConfig {
            path_prefix: String::new(),
            pprof_config: user.clone(),
        }));
        let catalog = defaults();

        for name in catalog_names() {
            prop_assert!(merged.pprof_config.contains_key(name));
            match user.get(name) {
                Some(given) => {
                    prop_assert_eq!(&merged.pprof_config[name], given);
                }
                None => {
                    prop_assert_eq!(&merged.pprof_config[name], &catalog[name]);
                }
            }
        }
        for (name, given) in &user {
            prop_assert_eq!(&merged.pprof_config[name], given);
        }
    }

    #[test]
    fn merged_paths_are_absolute(prefix in arb_prefix(), user in arb_user_endpoints()) {
        let merged = ProfilingConfig::merge(Some(ProfilingConfig {
            path_prefix: prefix,
            pprof_config: user,
        }));
        for endpoint in merged.pprof_config.values() {
            prop_assert!(endpoint.path.starts_with('/'));
        }
    }

    #[test]
    fn remerge_adds_prefix_again(prefix in arb_prefix()) {
        let first = ProfilingConfig::merge(Some(ProfilingConfig {
            path_prefix: prefix.clone(),
            pprof_config: PprofConfig::new(),
        }));
        let second = ProfilingConfig::merge(Some(first.clone()));
        for (name, endpoint) in &second.pprof_config {
            prop_assert_eq!(
                &endpoint.path,
                &format!("{}{}", absolute(&prefix), first.pprof_config[name].path)
            );
        }
    }
}
