//! Preloader outputs
//!
//! Writes the files the build-file generator reads from
//! `out/preloader/<product>`. All maps are ordered, so the same resolution
//! always produces byte-identical files.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::defaults::PLATFORM_NAME;
use crate::core::parts::{Parts, DIRECTIVE_FLAGS, SYSCAP_FLAG};
use crate::core::product::{ResolvedProduct, SyscapInfo};
use crate::error::FilesystemError;
use crate::infra::filesystem::{write_file, write_json};

pub const PARTS_JSON: &str = "parts.json";
pub const PARTS_CONFIG_JSON: &str = "parts_config.json";
pub const FEATURES_JSON: &str = "features.json";
pub const SYSCAP_JSON: &str = "syscap.json";
pub const BUILD_CONFIG_JSON: &str = "build_config.json";
pub const BUILD_PROP: &str = "build.prop";
pub const SUBSYSTEM_CONFIG_JSON: &str = "subsystem_config.json";
pub const BUILD_GNARGS_PROP: &str = "build_gnargs.prop";
pub const EXCLUSION_MODULES_JSON: &str = "exclusion_modules.json";
pub const PLATFORMS_BUILD: &str = "platforms.build";
pub const SYSTEM_CAPABILITY_JSON: &str = "SystemCapability.json";

const SYSCAP_OS_PREFIX: &str = "SystemCapability.";

/// Paths of the files written for one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    pub parts_json: PathBuf,
    pub parts_config_json: PathBuf,
    pub features_json: PathBuf,
    pub syscap_json: PathBuf,
    pub build_config_json: PathBuf,
    pub build_prop: PathBuf,
    pub subsystem_config_json: PathBuf,
    pub build_gnargs_prop: PathBuf,
    pub exclusion_modules_json: PathBuf,
    pub platforms_build: PathBuf,
    pub system_capability_json: PathBuf,
}

impl Outputs {
    /// Output paths under `dir`
    pub fn new(dir: &Path) -> Self {
        Self {
            parts_json: dir.join(PARTS_JSON),
            parts_config_json: dir.join(PARTS_CONFIG_JSON),
            features_json: dir.join(FEATURES_JSON),
            syscap_json: dir.join(SYSCAP_JSON),
            build_config_json: dir.join(BUILD_CONFIG_JSON),
            build_prop: dir.join(BUILD_PROP),
            subsystem_config_json: dir.join(SUBSYSTEM_CONFIG_JSON),
            build_gnargs_prop: dir.join(BUILD_GNARGS_PROP),
            exclusion_modules_json: dir.join(EXCLUSION_MODULES_JSON),
            platforms_build: dir.join(PLATFORMS_BUILD),
            system_capability_json: dir.join(SYSTEM_CAPABILITY_JSON),
        }
    }

    /// Every path, in write order
    pub fn all(&self) -> [&Path; 11] {
        [
            self.parts_json.as_path(),
            self.parts_config_json.as_path(),
            self.features_json.as_path(),
            self.syscap_json.as_path(),
            self.build_config_json.as_path(),
            self.build_prop.as_path(),
            self.subsystem_config_json.as_path(),
            self.build_gnargs_prop.as_path(),
            self.exclusion_modules_json.as_path(),
            self.platforms_build.as_path(),
            self.system_capability_json.as_path(),
        ]
    }
}

#[derive(Serialize)]
struct PartsList<'a> {
    parts: Vec<&'a str>,
}

/// Feature flags collected from every part
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Features {
    pub features: BTreeMap<String, Value>,
    pub part_to_feature: BTreeMap<String, Vec<String>>,
}

/// `platforms.build`: the single platform the build-file generator targets
#[derive(Debug, PartialEq, Serialize)]
pub struct PlatformsBuild {
    pub version: u32,
    pub platforms: BTreeMap<String, PlatformConfig>,
}

/// Toolchain selection of one platform
#[derive(Debug, PartialEq, Serialize)]
pub struct PlatformConfig {
    pub target_os: Value,
    pub target_cpu: Value,
    pub toolchain: Value,
    pub parts_config: String,
}

/// Capability lists of `SystemCapability.json`
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct SyscapLists {
    pub os: Vec<String>,
    pub private: Vec<String>,
}

/// `SystemCapability.json`: syscap info plus the capabilities of every part
#[derive(Debug, PartialEq, Serialize)]
pub struct SystemCapability<'a> {
    #[serde(flatten)]
    pub info: &'a SyscapInfo,
    pub syscap: SyscapLists,
}

/// `parts_config.json`: `{part_name: true}`, dashes mapped to underscores
pub fn parts_config(parts: &Parts) -> BTreeMap<String, bool> {
    parts
        .keys()
        .map(|key| {
            let part = key.split_once(':').map_or(key.as_str(), |(_, part)| part);
            (part.replace('-', "_"), true)
        })
        .collect()
}

/// `features.json` contents
///
/// The exclude and syscap entries are directives, not features.
pub fn collect_features(parts: &Parts) -> Features {
    let mut out = Features::default();
    for (key, features) in parts {
        let mut names = Vec::new();
        for (name, value) in features {
            if DIRECTIVE_FLAGS.contains(&name.as_str()) {
                continue;
            }
            out.features.insert(name.clone(), value.clone());
            names.push(name.clone());
        }
        if !names.is_empty() {
            out.part_to_feature.insert(key.clone(), names);
        }
    }
    out
}

/// `build_config.json`: build vars overlaid with device info
pub fn build_config(resolved: &ResolvedProduct) -> Map<String, Value> {
    let mut config = resolved.build_vars().clone();
    if let Some(info) = resolved.device().and_then(|d| d.device_info()) {
        config.extend(info.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(path) = resolved.product_build_path() {
        config.insert("product_build_path".into(), path.into());
    }
    config
}

/// `build.prop`: scalar entries of the build config as `key=value` lines
pub fn build_prop(config: &Map<String, Value>) -> String {
    let mut out = String::new();
    for (key, value) in config {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        let _ = writeln!(out, "{key}={rendered}");
    }
    out
}

/// `build_gnargs.prop`: every feature as a gn argument
///
/// Strings are quoted; arrays, objects and nulls have no gn form and are
/// skipped.
pub fn build_gnargs(features: &Features) -> String {
    let mut out = String::new();
    for (key, value) in &features.features {
        let rendered = match value {
            Value::String(s) => format!("\"{s}\""),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => continue,
        };
        let _ = writeln!(out, "{key}={rendered}");
    }
    out
}

/// `exclusion_modules.json`: `{part_key: {}}` for every removed part
pub fn exclusion_modules(excluded: &[String]) -> BTreeMap<String, Map<String, Value>> {
    excluded
        .iter()
        .map(|key| (key.clone(), Map::new()))
        .collect()
}

/// `platforms.build` from the device info
pub fn platforms_build(resolved: &ResolvedProduct) -> PlatformsBuild {
    let info = resolved.device().and_then(|d| d.device_info());
    let field = |key: &str| info.and_then(|i| i.get(key)).cloned().unwrap_or(Value::Null);
    let config = PlatformConfig {
        target_os: field("target_os"),
        target_cpu: field("target_cpu"),
        toolchain: info
            .and_then(|i| i.get("toolchain"))
            .cloned()
            .unwrap_or_else(|| Value::from("")),
        parts_config: format!("./{PARTS_JSON}"),
    };
    PlatformsBuild {
        version: 2,
        platforms: BTreeMap::from([(PLATFORM_NAME.to_string(), config)]),
    }
}

/// Capabilities declared by the parts' `syscap` lists
///
/// `"Name = false"` drops a capability and `"Name = true"` is the same as
/// `"Name"`. Names outside the `SystemCapability.` namespace are private.
pub fn collect_syscaps(parts: &Parts) -> SyscapLists {
    let mut os = std::collections::BTreeSet::new();
    let mut private = std::collections::BTreeSet::new();
    let entries = parts
        .values()
        .filter_map(|features| features.get(SYSCAP_FLAG))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str);

    for entry in entries {
        let (name, enabled) = match entry.split_once('=') {
            Some((name, flag)) => (name.trim(), flag.trim() != "false"),
            None => (entry.trim(), true),
        };
        if !enabled || name.is_empty() {
            continue;
        }
        if name.starts_with(SYSCAP_OS_PREFIX) {
            os.insert(name.to_string());
        } else {
            private.insert(name.to_string());
        }
    }

    SyscapLists {
        os: os.into_iter().collect(),
        private: private.into_iter().collect(),
    }
}

/// Write every output file for a resolved product into `dir`
pub fn write_outputs(resolved: &ResolvedProduct, dir: &Path) -> Result<Outputs, FilesystemError> {
    let outputs = Outputs::new(dir);
    let parts = resolved.parts();

    write_json(
        &outputs.parts_json,
        &PartsList {
            parts: parts.keys().map(String::as_str).collect(),
        },
    )?;
    write_json(&outputs.parts_config_json, &parts_config(parts))?;
    let features = collect_features(parts);
    write_json(&outputs.features_json, &features)?;
    write_json(&outputs.syscap_json, resolved.syscap_info())?;

    let config = build_config(resolved);
    write_json(&outputs.build_config_json, &config)?;
    write_file(&outputs.build_prop, &build_prop(&config))?;
    write_json(&outputs.subsystem_config_json, &resolved.subsystems())?;
    write_file(&outputs.build_gnargs_prop, &build_gnargs(&features))?;
    write_json(
        &outputs.exclusion_modules_json,
        &exclusion_modules(resolved.excluded_parts()),
    )?;
    write_json(&outputs.platforms_build, &platforms_build(resolved))?;
    write_json(
        &outputs.system_capability_json,
        &SystemCapability {
            info: resolved.syscap_info(),
            syscap: collect_syscaps(parts),
        },
    )?;

    tracing::info!(
        "Wrote preloader outputs for '{}' to {}",
        resolved.name(),
        dir.display()
    );
    Ok(outputs)
}
