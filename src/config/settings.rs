//! Source tree layout
//!
//! Reads optional overrides from a TOML settings file (`.hb-preloader.toml`
//! in the source root, or an explicit path) and from the environment.
//! Everything not overridden falls back to the standard tree layout.
//!
//! Environment variables applied after the settings file:
//! - `HB_PRODUCT_DIR` - Built-in product descriptor directory
//! - `HB_DEVICE_CONFIG_DIR` - Built-in device descriptor directory
//! - `HB_VENDOR_DIR` - Vendor product directory
//! - `HB_OUTPUT_DIR` - Root of the preloader outputs

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    BASE_CONFIG_SUBDIR, DEVICE_CONFIG_SUBDIR, DEVICE_SUBDIR, OUTPUT_SUBDIR,
    PRODUCT_CONFIG_SUBDIR, SETTINGS_FILE_NAME, VENDOR_SUBDIR,
};
use crate::error::SettingsError;

/// Environment variable names for directory overrides
pub const ENV_PRODUCT_DIR: &str = "HB_PRODUCT_DIR";
pub const ENV_DEVICE_CONFIG_DIR: &str = "HB_DEVICE_CONFIG_DIR";
pub const ENV_VENDOR_DIR: &str = "HB_VENDOR_DIR";
pub const ENV_OUTPUT_DIR: &str = "HB_OUTPUT_DIR";

/// Contents of a settings file
///
/// Relative paths are taken relative to the source root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Built-in product descriptor directory
    pub product_dir: Option<PathBuf>,

    /// Built-in device descriptor directory
    pub device_config_dir: Option<PathBuf>,

    /// Vendor product directory
    pub vendor_dir: Option<PathBuf>,

    /// Root of the preloader outputs
    pub output_dir: Option<PathBuf>,
}

impl SettingsFile {
    /// Load a settings file
    ///
    /// A missing file yields the empty settings unless `required` is set.
    pub fn load_from_path(path: &Path, required: bool) -> Result<Self, SettingsError> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

/// Resolved directory layout of a source tree
///
/// Constructed once by the caller and passed into every resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Source root
    pub source_root: PathBuf,
    /// Built-in product descriptors
    pub product_dir: PathBuf,
    /// Built-in device descriptors (`{device_name}.json`)
    pub device_config_dir: PathBuf,
    /// Vendor product configs
    pub vendor_dir: PathBuf,
    /// Device build directories
    pub device_dir: PathBuf,
    /// Base system configs (`{os_level}_system.json`)
    pub base_dir: PathBuf,
    /// Root of the preloader outputs
    pub output_root: PathBuf,
}

impl Settings {
    /// Standard layout under `source_root`
    pub fn from_root(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        Self {
            product_dir: source_root.join(PRODUCT_CONFIG_SUBDIR),
            device_config_dir: source_root.join(DEVICE_CONFIG_SUBDIR),
            vendor_dir: source_root.join(VENDOR_SUBDIR),
            device_dir: source_root.join(DEVICE_SUBDIR),
            base_dir: source_root.join(BASE_CONFIG_SUBDIR),
            output_root: source_root.join(OUTPUT_SUBDIR),
            source_root,
        }
    }

    /// Load the layout for `source_root`
    ///
    /// Reads `settings_path` if given (it must exist), else the settings
    /// file in the source root if present, then applies environment
    /// overrides.
    pub fn load(source_root: &Path, settings_path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match settings_path {
            Some(path) => SettingsFile::load_from_path(path, true)?,
            None => SettingsFile::load_from_path(&source_root.join(SETTINGS_FILE_NAME), false)?,
        };

        let mut settings = Self::from_root(source_root);
        settings.apply_file(&file);
        settings.apply_overrides(|key| env::var(key).ok());
        Ok(settings)
    }

    /// Apply values from a settings file
    pub fn apply_file(&mut self, file: &SettingsFile) {
        if let Some(dir) = &file.product_dir {
            self.product_dir = self.source_root.join(dir);
        }
        if let Some(dir) = &file.device_config_dir {
            self.device_config_dir = self.source_root.join(dir);
        }
        if let Some(dir) = &file.vendor_dir {
            self.vendor_dir = self.source_root.join(dir);
        }
        if let Some(dir) = &file.output_dir {
            self.output_root = self.source_root.join(dir);
        }
    }

    /// Apply overrides from a variable lookup (the environment in production)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets = [
            (ENV_PRODUCT_DIR, &mut self.product_dir),
            (ENV_DEVICE_CONFIG_DIR, &mut self.device_config_dir),
            (ENV_VENDOR_DIR, &mut self.vendor_dir),
            (ENV_OUTPUT_DIR, &mut self.output_root),
        ];
        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                tracing::debug!("{key} overrides {}", target.display());
                *target = self.source_root.join(value);
            }
        }
    }

    /// Output directory of one product
    pub fn output_dir(&self, product: &str) -> PathBuf {
        self.output_root.join(product)
    }
}
