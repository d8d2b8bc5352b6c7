//! Build variable derivation
//!
//! Produces the flat record the build-file generator consumes. Its shape
//! depends on the schema version:
//!
//! - 1.0: exactly `{"os_level": "large"}`
//! - 2.0: `os_level`, `device_name`, `product_company`, `product_name`
//! - 3.0: same keys, with `product_company` resolved through a fallback chain
//!
//! 2.0 and 3.0 also copy `enable_ramdisk`, `build_selinux`, `build_seccomp`
//! and `support_jsapi` when the descriptor sets them.

use serde_json::{Map, Value};
use std::path::{Component, Path};

use crate::config::Settings;
use crate::core::schema::{ProductDescriptor, SchemaVersion};
use crate::infra::filesystem::normalize_path;

/// Flat build variables
pub type BuildVars = Map<String, Value>;

fn opt_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

/// Derive the build variables of a product
pub fn derive_build_vars(
    descriptor: &ProductDescriptor,
    version: SchemaVersion,
    config_file: &Path,
    settings: &Settings,
) -> BuildVars {
    let mut vars = BuildVars::new();
    if version == SchemaVersion::V1 {
        // 1.0 ignores `type`
        vars.insert("os_level".into(), version.defaults().os_level.into());
        return vars;
    }

    vars.insert(
        "os_level".into(),
        descriptor.os_level_or_default(version).into(),
    );
    if version == SchemaVersion::V2 {
        let device_name = descriptor
            .product_device
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_default();
        vars.insert("device_name".into(), device_name.into());
        vars.insert(
            "product_company".into(),
            opt_string(descriptor.product_company.as_deref()),
        );
    } else {
        vars.insert("device_name".into(), opt_string(descriptor.board.as_deref()));
        let company = resolve_product_company(descriptor, config_file, settings);
        vars.insert("product_company".into(), opt_string(company.as_deref()));
    }

    vars.insert(
        "product_name".into(),
        opt_string(descriptor.product_name.as_deref()),
    );
    for (key, value) in descriptor.passthrough_flags() {
        vars.insert(key.into(), value.clone());
    }
    vars
}

/// Company of a 3.0 product
///
/// Explicit `product_company`; else, for descriptors outside the built-in
/// product directory, the first path segment below the vendor directory;
/// else `device_company`.
pub fn resolve_product_company(
    descriptor: &ProductDescriptor,
    config_file: &Path,
    settings: &Settings,
) -> Option<String> {
    if let Some(company) = descriptor
        .product_company
        .as_deref()
        .filter(|c| !c.is_empty())
    {
        return Some(company.to_string());
    }

    if !is_built_in_product(config_file, settings) {
        if let Some(company) = vendor_company(config_file, &settings.vendor_dir) {
            return Some(company);
        }
        tracing::debug!(
            "{} is outside {}, using device_company",
            config_file.display(),
            settings.vendor_dir.display()
        );
    }

    descriptor.device_company.clone()
}

/// Whether a descriptor lives directly in the built-in product directory
///
/// Both paths are normalized, so relative and dotted forms compare equal.
pub fn is_built_in_product(config_file: &Path, settings: &Settings) -> bool {
    let config_file = normalize_path(config_file);
    config_file.parent() == Some(normalize_path(&settings.product_dir).as_path())
}

/// First path segment of `config_file` relative to `vendor_dir`
pub fn vendor_company(config_file: &Path, vendor_dir: &Path) -> Option<String> {
    let config_file = normalize_path(config_file);
    let vendor_dir = normalize_path(vendor_dir);
    let relative = config_file.strip_prefix(&vendor_dir).ok()?;
    match relative.components().next()? {
        Component::Normal(segment) if relative.components().count() > 1 => {
            Some(segment.to_string_lossy().into_owned())
        }
        _ => None,
    }
}
