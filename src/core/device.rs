//! Device resolution
//!
//! A product is bound to at most one device. Version 2.0 descriptors name
//! the device in `product_device` and its info lives in a standalone
//! descriptor (`{device_config_dir}/{device_name}.json`). Version 1.0 and
//! 3.0 descriptors describe the device inline through `board` and friends.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::defaults::{DEFAULT_TARGET_CPU, DEFAULT_TARGET_OS};
use crate::config::Settings;
use crate::core::parts::{part_key, subsystem_entry, FeatureConfig, Parts, Subsystems};
use crate::core::schema::{ProductDescriptor, SchemaVersion};
use crate::error::ResolveError;
use crate::infra::loader::{self, Record};

/// A resolved device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    name: String,
    device_info: Option<Record>,
}

impl Device {
    /// Create a device from already resolved info
    pub fn new(name: impl Into<String>, device_info: Option<Record>) -> Self {
        Self {
            name: name.into(),
            device_info,
        }
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device info, if any
    pub fn device_info(&self) -> Option<&Record> {
        self.device_info.as_ref()
    }

    /// `device_build_path` from the device info
    pub fn device_build_path(&self) -> Option<&str> {
        self.device_info
            .as_ref()
            .and_then(|info| info.get("device_build_path"))
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }

    fn subsystem_name(&self) -> String {
        format!("device_{}", self.name)
    }

    /// Synthetic `device_{name}:device_{name}` part
    ///
    /// Only devices with a build path contribute one.
    pub fn specific_parts(&self) -> Parts {
        if self.device_build_path().is_none() {
            return Parts::new();
        }
        let name = self.subsystem_name();
        Parts::from([(part_key(&name, &name), FeatureConfig::new())])
    }

    /// Synthetic `device_{name}` subsystem pointing at the build path
    pub fn subsystem(&self) -> Subsystems {
        match self.device_build_path() {
            Some(path) => subsystem_entry(&self.subsystem_name(), path),
            None => Subsystems::new(),
        }
    }
}

/// Determine the device of a product
///
/// Returns `Ok(None)` when the descriptor names no device.
pub fn resolve_device(
    descriptor: &ProductDescriptor,
    version: SchemaVersion,
    settings: &Settings,
    config_file: &Path,
) -> Result<Option<Device>, ResolveError> {
    if version.defaults().standalone_device {
        return match non_empty(descriptor.product_device.as_deref()) {
            Some(device_name) => {
                load_device_descriptor(device_name, &settings.device_config_dir).map(Some)
            }
            None => Ok(None),
        };
    }

    match non_empty(descriptor.board.as_deref()) {
        Some(board) => {
            let info = inline_device_info(board, descriptor, settings, config_file)?;
            Ok(Some(Device::new(board, Some(info))))
        }
        None => Ok(None),
    }
}

/// Load `{device_config_dir}/{device_name}.json`
pub fn load_device_descriptor(
    device_name: &str,
    device_config_dir: &Path,
) -> Result<Device, ResolveError> {
    let path = device_config_dir.join(format!("{device_name}.json"));
    let info = loader::load(&path)?;

    if !info.is_empty() {
        let declared = info.get("device_name").and_then(Value::as_str);
        if declared != Some(device_name) {
            return Err(ResolveError::DeviceNameMismatch {
                path,
                expected: device_name.to_string(),
                found: declared.map(str::to_string),
            });
        }
    }

    Ok(Device::new(device_name, Some(info)))
}

/// Synthesize device info from the product descriptor's own fields
fn inline_device_info(
    board: &str,
    descriptor: &ProductDescriptor,
    settings: &Settings,
    config_file: &Path,
) -> Result<Record, ResolveError> {
    let device_company = non_empty(descriptor.device_company.as_deref()).ok_or_else(|| {
        ResolveError::MissingRequiredField {
            path: config_file.to_path_buf(),
            field: "device_company".to_string(),
        }
    })?;

    let mut info = Record::new();
    info.insert("device_name".into(), board.into());
    info.insert("device_company".into(), device_company.into());

    let target_os = non_empty(descriptor.target_os.as_deref()).unwrap_or(DEFAULT_TARGET_OS);
    info.insert("target_os".into(), target_os.into());

    let target_cpu = match non_empty(descriptor.target_cpu.as_deref()) {
        Some(cpu) => cpu,
        None => {
            // Selects the default toolchain of standard systems
            tracing::warn!(
                "The target_cpu needs to be specified, default target_cpu={DEFAULT_TARGET_CPU}"
            );
            DEFAULT_TARGET_CPU
        }
    };
    info.insert("target_cpu".into(), target_cpu.into());

    if let Some(kernel_version) = non_empty(descriptor.kernel_version.as_deref()) {
        info.insert("kernel_version".into(), kernel_version.into());
    }

    let device_build_path = match non_empty(descriptor.device_build_path.as_deref()) {
        Some(path) => path.to_string(),
        None => probe_device_build_path(&settings.device_dir, device_company, board)
            .to_string_lossy()
            .into_owned(),
    };
    info.insert("device_build_path".into(), device_build_path.into());

    Ok(info)
}

/// `{device_dir}/{company}/{board}`, else `{device_dir}/board/{company}/{board}`
///
/// The second layout is returned whether or not it exists.
pub fn probe_device_build_path(device_dir: &Path, company: &str, board: &str) -> PathBuf {
    let flat = device_dir.join(company).join(board);
    if flat.exists() {
        return flat;
    }
    device_dir.join("board").join(company).join(board)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
