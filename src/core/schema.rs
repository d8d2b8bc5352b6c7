//! Product descriptor schema
//!
//! Product descriptors come in three incompatible generations, selected by
//! the `version` field. [`ProductDescriptor`] is the typed view of every
//! field the resolver reads; the raw record is kept alongside it for the
//! vendor parts list normalization, which reads shapes the typed view does
//! not model.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::defaults::{
    version_defaults, VersionDefaults, BASED_ON_MINIMUM_SYSTEM_TRUE, DEFAULT_API_VERSION,
    DEFAULT_MANUFACTURER_ID, DEFAULT_SCHEMA_VERSION,
};
use crate::core::parts::Parts;
use crate::error::ResolveError;
use crate::infra::loader::Record;

/// Product descriptor schema generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// `"1.0"`: no parts, fixed `os_level`
    V1,
    /// `"2.0"`: explicit `parts`, standalone device descriptor
    V2,
    /// `"3.0"`: vendor parts list, inline device
    #[default]
    V3,
}

impl SchemaVersion {
    /// The `version` string of this generation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }

    /// Field defaults of this generation
    pub fn defaults(self) -> &'static VersionDefaults {
        match version_defaults(self.as_str()) {
            Some(row) => row,
            None => unreachable!("every schema version has a defaults row"),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(Self::V1),
            "2.0" => Ok(Self::V2),
            "3.0" => Ok(Self::V3),
            other => Err(ResolveError::UnsupportedVersion {
                version: other.to_string(),
            }),
        }
    }
}

/// Typed view of a product descriptor
///
/// Every field is optional; defaults come from the version row in
/// [`crate::config::defaults::VERSION_DEFAULTS`] or from the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductDescriptor {
    pub product_name: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "type")]
    pub os_level: Option<String>,
    pub board: Option<String>,
    pub device_company: Option<String>,
    pub target_os: Option<String>,
    pub target_cpu: Option<String>,
    pub kernel_version: Option<String>,
    pub device_build_path: Option<String>,
    pub inherit: Option<Vec<String>>,
    pub based_on_mininum_system: Option<String>,
    pub system_component: Option<String>,
    pub parts: Option<Parts>,
    pub product_build_path: Option<String>,
    pub product_company: Option<String>,
    pub product_device: Option<String>,
    pub enable_ramdisk: Option<Value>,
    pub build_selinux: Option<Value>,
    pub build_seccomp: Option<Value>,
    pub support_jsapi: Option<Value>,
    pub api_version: Option<Value>,
    pub manufacturer_id: Option<Value>,

    /// The decoded record this view was built from
    #[serde(skip)]
    pub raw: Record,
}

/// Build-var flags copied only when present in the descriptor
pub const PASSTHROUGH_FLAGS: [&str; 4] =
    ["enable_ramdisk", "build_selinux", "build_seccomp", "support_jsapi"];

impl ProductDescriptor {
    /// Build the typed view of a decoded record
    pub fn from_record(record: Record, path: &Path) -> Result<Self, ResolveError> {
        let mut descriptor: Self = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| ResolveError::ConfigMalformed {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        descriptor.raw = record;
        Ok(descriptor)
    }

    /// Schema version, defaulting to `"3.0"`
    pub fn schema_version(&self) -> Result<SchemaVersion, ResolveError> {
        self.version
            .as_deref()
            .unwrap_or(DEFAULT_SCHEMA_VERSION)
            .parse()
    }

    /// `type`, or the version's default os level
    pub fn os_level_or_default(&self, version: SchemaVersion) -> &str {
        self.os_level
            .as_deref()
            .unwrap_or(version.defaults().os_level)
    }

    /// Whether the base system layer applies
    pub fn based_on_minimum_system(&self) -> bool {
        self.based_on_mininum_system.as_deref() == Some(BASED_ON_MINIMUM_SYSTEM_TRUE)
    }

    /// Syscap `api_version`, passed through whatever its JSON type
    pub fn api_version_or_default(&self) -> Value {
        self.api_version
            .clone()
            .unwrap_or_else(|| Value::from(DEFAULT_API_VERSION))
    }

    /// Syscap `manufacturer_id`
    pub fn manufacturer_id_or_default(&self) -> Value {
        self.manufacturer_id
            .clone()
            .unwrap_or_else(|| Value::from(DEFAULT_MANUFACTURER_ID))
    }

    /// Passthrough build-var flags present in the descriptor
    pub fn passthrough_flags(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        [
            &self.enable_ramdisk,
            &self.build_selinux,
            &self.build_seccomp,
            &self.support_jsapi,
        ]
        .into_iter()
        .zip(PASSTHROUGH_FLAGS)
        .filter_map(|(value, key)| value.as_ref().map(|v| (key, v)))
    }
}
