//! Part sources and the layered merge
//!
//! A product's parts are accumulated from up to four sources, in order:
//!
//! 1. the base system config (`{os_level}_system.json`)
//! 2. every inherited config, in list order
//! 3. the system-component config, which only fills in missing keys
//! 4. the product itself (plus its synthetic product and device parts)
//!
//! Every layer except the third overwrites on key collision. After the
//! merge, parts whose feature config carries `"exclude": "true"` are dropped.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::defaults::EXCLUDE_TRUE;
use crate::error::ResolveError;
use crate::infra::loader::{self, Record};

/// `"subsystem:part"` identifier
pub type PartKey = String;

/// Feature flags of one part
pub type FeatureConfig = Map<String, Value>;

/// Part mapping, ordered by key
pub type Parts = BTreeMap<PartKey, FeatureConfig>;

/// Build directory of a synthetic subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemInfo {
    pub name: String,
    pub path: String,
}

/// Subsystem records keyed by subsystem name
pub type Subsystems = BTreeMap<String, SubsystemInfo>;

/// Feature flag that removes a part after the merge
pub const EXCLUDE_FLAG: &str = "exclude";

/// Per-part system capability list
pub const SYSCAP_FLAG: &str = "syscap";

/// Component keys that are directives rather than features
pub const DIRECTIVE_FLAGS: [&str; 2] = [EXCLUDE_FLAG, SYSCAP_FLAG];

/// Build a part key
pub fn part_key(subsystem: &str, part: &str) -> PartKey {
    format!("{subsystem}:{part}")
}

/// Whether a feature config marks its part as excluded
///
/// Only the string `"true"` counts; a JSON boolean does not.
pub fn is_excluded(features: &FeatureConfig) -> bool {
    features.get(EXCLUDE_FLAG).and_then(Value::as_str) == Some(EXCLUDE_TRUE)
}

/// Accumulator for the layered merge
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartsMerger {
    parts: Parts,
}

impl PartsMerger {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, replacing entries with the same key
    pub fn overlay(&mut self, layer: Parts) -> &mut Self {
        self.parts.extend(layer);
        self
    }

    /// Add a layer, keeping entries that are already present
    ///
    /// Returns the number of parts the layer contributed.
    pub fn fill_missing(&mut self, layer: Parts) -> usize {
        let mut added = 0;
        for (key, features) in layer {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.parts.entry(key) {
                slot.insert(features);
                added += 1;
            }
        }
        added
    }

    /// Drop excluded parts, returning their keys
    pub fn remove_excluded(&mut self) -> Vec<PartKey> {
        let excluded: Vec<PartKey> = self
            .parts
            .iter()
            .filter(|(_, features)| is_excluded(features))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &excluded {
            self.parts.remove(key);
        }
        excluded
    }

    /// Current number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no parts have been accumulated
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Current parts
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Finish the merge
    pub fn into_parts(self) -> Parts {
        self.parts
    }
}

/// Read a `parts` mapping out of a JSON value
fn parts_from_value(value: Value, path: &Path) -> Result<Parts, ResolveError> {
    serde_json::from_value(value).map_err(|e| ResolveError::ConfigMalformed {
        path: path.to_path_buf(),
        error: format!("invalid parts mapping: {e}"),
    })
}

/// Parts declared by a config record
///
/// Uses the `parts` mapping when it is present and non-empty, otherwise the
/// vendor parts list normalized from `subsystems`.
pub fn parts_of(record: &Record, path: &Path) -> Result<Parts, ResolveError> {
    match record.get("parts") {
        Some(Value::Object(map)) if !map.is_empty() => {
            parts_from_value(Value::Object(map.clone()), path)
        }
        _ => Ok(vendor_parts_list(record)),
    }
}

/// Normalize the legacy `subsystems` shape into a part mapping
///
/// Each `{"subsystem": S, "components": [{"component": P, "features": [..]}]}`
/// entry yields `S:P`. Feature strings of the form `name = value` become
/// typed feature entries; components without features get an empty config.
/// A component's own `exclude` and `syscap` values are carried into its
/// config so the exclusion pass and the capability list see them.
pub fn vendor_parts_list(record: &Record) -> Parts {
    let mut parts = Parts::new();
    let Some(subsystems) = record.get("subsystems").and_then(Value::as_array) else {
        return parts;
    };

    for subsystem in subsystems {
        let Some(subsystem_name) = subsystem.get("subsystem").and_then(Value::as_str) else {
            tracing::warn!("Skipping subsystem entry without a name: {subsystem}");
            continue;
        };
        let components = subsystem
            .get("components")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for component in components {
            let Some(part_name) = component.get("component").and_then(Value::as_str) else {
                tracing::warn!(
                    "Skipping component without a name in subsystem '{subsystem_name}'"
                );
                continue;
            };
            let mut features = component
                .get("features")
                .and_then(Value::as_array)
                .map(|list| parse_features(list))
                .unwrap_or_default();
            for flag in DIRECTIVE_FLAGS {
                if let Some(value) = component.get(flag) {
                    features.insert(flag.to_string(), value.clone());
                }
            }
            parts.insert(part_key(subsystem_name, part_name), features);
        }
    }

    parts
}

fn feature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9_.\-]+)\s*=\s*(.*?)\s*$").expect("Invalid feature pattern")
    })
}

/// Parse `name = value` feature strings
fn parse_features(list: &[Value]) -> FeatureConfig {
    let mut features = FeatureConfig::new();
    for entry in list.iter().filter_map(Value::as_str) {
        match feature_pattern().captures(entry) {
            Some(caps) => {
                features.insert(caps[1].to_string(), feature_value(&caps[2]));
            }
            None => tracing::warn!("Ignoring malformed feature '{entry}'"),
        }
    }
    features
}

/// Bare `true`/`false` and integers are typed; anything quoted stays a string
fn feature_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(raw.trim_matches('"').to_string()),
        },
    }
}

/// Base layer: `{base_dir}/{os_level}_system.json`
pub fn base_parts(base_dir: &Path, os_level: &str) -> Result<Parts, ResolveError> {
    let path = base_dir.join(format!("{os_level}_system.json"));
    let record = loader::load(&path)?;
    parts_from_value(Value::Object(record), &path)
}

/// Inherited layer: every config in `inherit`, later entries winning
pub fn inherited_parts(inherit: &[String], source_root: &Path) -> Result<Parts, ResolveError> {
    let mut merger = PartsMerger::new();
    for relative in inherit {
        let path = source_root.join(relative);
        let record = loader::load(&path)?;
        merger.overlay(parts_of(&record, &path)?);
    }
    Ok(merger.into_parts())
}

/// System-component layer: the parts of the `system_component` config
pub fn system_component_parts(relative: &str, source_root: &Path) -> Result<Parts, ResolveError> {
    let path = source_root.join(relative);
    let record = loader::load(&path)?;
    parts_of(&record, &path)
}

/// Synthetic subsystem record with a single entry
pub fn subsystem_entry(name: &str, path: &str) -> Subsystems {
    Subsystems::from([(
        name.to_string(),
        SubsystemInfo {
            name: name.to_string(),
            path: path.to_string(),
        },
    )])
}

/// Synthetic part of the product itself
pub fn product_specific_parts(product_name: &str) -> Parts {
    let name = format!("product_{product_name}");
    Parts::from([(part_key(&name, &name), FeatureConfig::new())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::generators::{feature_config, parts_map};
    use proptest::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn features(value: Value) -> FeatureConfig {
        record(value)
    }

    // ============================================
    // Unit Tests - merge layers
    // ============================================

    #[test]
    fn test_overlay_replaces_existing_key() {
        let mut merger = PartsMerger::new();
        merger.overlay(Parts::from([(
            "a:x".to_string(),
            features(json!({"level": 1})),
        )]));
        merger.overlay(Parts::from([(
            "a:x".to_string(),
            features(json!({"level": 2})),
        )]));

        assert_eq!(merger.len(), 1);
        assert_eq!(merger.parts()["a:x"]["level"], 2);
    }

    #[test]
    fn test_fill_missing_never_replaces() {
        let mut merger = PartsMerger::new();
        merger.overlay(Parts::from([(
            "a:x".to_string(),
            features(json!({"from": "inherit"})),
        )]));

        let added = merger.fill_missing(Parts::from([
            ("a:x".to_string(), features(json!({"from": "system"}))),
            ("b:y".to_string(), FeatureConfig::new()),
        ]));

        assert_eq!(added, 1);
        assert_eq!(merger.parts()["a:x"]["from"], "inherit");
        assert!(merger.parts().contains_key("b:y"));
    }

    #[test]
    fn test_exclude_is_string_comparison() {
        let mut merger = PartsMerger::new();
        merger.overlay(Parts::from([
            ("a:string".to_string(), features(json!({"exclude": "true"}))),
            ("a:bool".to_string(), features(json!({"exclude": true}))),
            ("a:false".to_string(), features(json!({"exclude": "false"}))),
            ("a:none".to_string(), FeatureConfig::new()),
        ]));

        let removed = merger.remove_excluded();

        assert_eq!(removed, vec!["a:string".to_string()]);
        let keys: Vec<_> = merger.parts().keys().cloned().collect();
        assert_eq!(keys, vec!["a:bool", "a:false", "a:none"]);
    }

    // ============================================
    // Unit Tests - vendor parts list
    // ============================================

    #[test]
    fn test_vendor_parts_list_normalizes_subsystems() {
        let config = record(json!({
            "subsystems": [
                {
                    "subsystem": "startup",
                    "components": [
                        {"component": "init"},
                        {"component": "bootstrap_lite", "features": [
                            "enable_ohos_startup_init_feature_begetctl_liteos = true",
                            "init_lite_max_jobs=8",
                            "bootstrap_name = \"lite\""
                        ]}
                    ]
                },
                {"subsystem": "hiviewdfx", "components": [{"component": "hilog_lite"}]}
            ]
        }));

        let parts = vendor_parts_list(&config);

        assert_eq!(parts.len(), 3);
        assert!(parts["startup:init"].is_empty());
        assert!(parts["hiviewdfx:hilog_lite"].is_empty());
        let bootstrap = &parts["startup:bootstrap_lite"];
        assert_eq!(bootstrap["enable_ohos_startup_init_feature_begetctl_liteos"], true);
        assert_eq!(bootstrap["init_lite_max_jobs"], 8);
        assert_eq!(bootstrap["bootstrap_name"], "lite");
    }

    #[test]
    fn test_vendor_parts_list_keeps_component_directives() {
        let config = record(json!({
            "subsystems": [{
                "subsystem": "kernel",
                "components": [
                    {"component": "linux", "exclude": "true"},
                    {"component": "liteos_m", "syscap": ["SystemCapability.Kernel.Core"],
                     "features": ["kernel_debug = false"]},
                    {"component": "keep", "owner": "ignored"}
                ]
            }]
        }));

        let parts = vendor_parts_list(&config);

        assert_eq!(parts["kernel:linux"]["exclude"], "true");
        assert_eq!(parts["kernel:liteos_m"]["syscap"], json!(["SystemCapability.Kernel.Core"]));
        assert_eq!(parts["kernel:liteos_m"]["kernel_debug"], false);
        assert!(parts["kernel:keep"].is_empty());

        let mut merger = PartsMerger::new();
        merger.overlay(parts);
        assert_eq!(merger.remove_excluded(), vec!["kernel:linux".to_string()]);
    }

    #[test]
    fn test_feature_quoted_values_stay_strings() {
        let config = record(json!({
            "subsystems": [{
                "subsystem": "a",
                "components": [{"component": "x", "features": [
                    "flag = \"true\"",
                    "count = \"8\"",
                    "plain = true"
                ]}]
            }]
        }));

        let parts = vendor_parts_list(&config);

        assert_eq!(parts["a:x"]["flag"], "true");
        assert_eq!(parts["a:x"]["count"], "8");
        assert_eq!(parts["a:x"]["plain"], true);
    }

    #[test]
    fn test_vendor_parts_list_skips_nameless_entries() {
        let config = record(json!({
            "subsystems": [
                {"components": [{"component": "orphan"}]},
                {"subsystem": "kernel", "components": [{"features": []}, {"component": "liteos_m"}]}
            ]
        }));

        let parts = vendor_parts_list(&config);
        assert_eq!(parts.keys().collect::<Vec<_>>(), vec!["kernel:liteos_m"]);
    }

    #[test]
    fn test_vendor_parts_list_without_subsystems_is_empty() {
        assert!(vendor_parts_list(&record(json!({"product_name": "demo"}))).is_empty());
    }

    #[test]
    fn test_parts_of_prefers_non_empty_parts() {
        let path = Path::new("inherit.json");
        let with_parts = record(json!({
            "parts": {"a:x": {}},
            "subsystems": [{"subsystem": "b", "components": [{"component": "y"}]}]
        }));
        assert!(parts_of(&with_parts, path).unwrap().contains_key("a:x"));

        let empty_parts = record(json!({
            "parts": {},
            "subsystems": [{"subsystem": "b", "components": [{"component": "y"}]}]
        }));
        assert!(parts_of(&empty_parts, path).unwrap().contains_key("b:y"));
    }

    #[test]
    fn test_parts_of_rejects_non_object_features() {
        let bad = record(json!({"parts": {"a:x": "yes"}}));
        let err = parts_of(&bad, Path::new("bad.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigMalformed);
    }

    // ============================================
    // Unit Tests - file-backed layers
    // ============================================

    #[test]
    fn test_base_parts_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = base_parts(temp_dir.path(), "mini").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
        assert!(err.to_string().contains("mini_system.json"));
    }

    #[test]
    fn test_base_parts_reads_mapping() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("standard_system.json"),
            r#"{"ace:napi": {}, "hilog:hilog": {"debug": "false"}}"#,
        )
        .unwrap();

        let parts = base_parts(temp_dir.path(), "standard").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts["hilog:hilog"]["debug"], "false");
    }

    #[test]
    fn test_inherited_parts_later_entries_win() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("first.json"),
            r#"{"parts": {"a:x": {"v": 1}, "a:y": {}}}"#,
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("second.json"),
            r#"{"parts": {"a:x": {"v": 2}}}"#,
        )
        .unwrap();

        let parts = inherited_parts(
            &["first.json".to_string(), "second.json".to_string()],
            temp_dir.path(),
        )
        .unwrap();

        assert_eq!(parts["a:x"]["v"], 2);
        assert!(parts.contains_key("a:y"));
    }

    #[test]
    fn test_inherited_parts_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = inherited_parts(&["nope.json".to_string()], temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
    }

    #[test]
    fn test_product_specific_part() {
        let parts = product_specific_parts("demo");
        assert!(parts["product_demo:product_demo"].is_empty());
    }

    // ============================================
    // Property Tests
    // ============================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A later overlay always wins on shared keys
        #[test]
        fn prop_overlay_later_layer_wins(lower in parts_map(), upper in parts_map()) {
            let mut merger = PartsMerger::new();
            merger.overlay(lower.clone());
            merger.overlay(upper.clone());
            let merged = merger.into_parts();

            for (key, value) in &upper {
                prop_assert_eq!(&merged[key], value);
            }
            for (key, value) in &lower {
                if !upper.contains_key(key) {
                    prop_assert_eq!(&merged[key], value);
                }
            }
        }

        /// The fill-missing layer never changes existing entries
        #[test]
        fn prop_fill_missing_keeps_existing(existing in parts_map(), layer in parts_map()) {
            let mut merger = PartsMerger::new();
            merger.overlay(existing.clone());
            merger.fill_missing(layer.clone());
            let merged = merger.into_parts();

            for (key, value) in &existing {
                prop_assert_eq!(&merged[key], value);
            }
            for key in layer.keys() {
                prop_assert!(merged.contains_key(key));
            }
        }

        /// No excluded part survives, every other part does
        #[test]
        fn prop_remove_excluded(parts in parts_map(), extra in feature_config()) {
            let mut merger = PartsMerger::new();
            merger.overlay(parts.clone());
            let mut flagged = extra;
            flagged.insert(EXCLUDE_FLAG.to_string(), Value::from(EXCLUDE_TRUE));
            merger.overlay(Parts::from([("excluded:part".to_string(), flagged)]));

            merger.remove_excluded();
            let remaining = merger.into_parts();

            prop_assert!(!remaining.contains_key("excluded:part"));
            for (key, value) in &parts {
                prop_assert_eq!(remaining.contains_key(key), !is_excluded(value));
            }
        }
    }
}
