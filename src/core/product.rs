//! Product resolution
//!
//! [`ProductResolver::resolve`] turns a product descriptor into an immutable
//! [`ResolvedProduct`]: device, merged parts, build variables and syscap
//! info. [`Product`] wraps a resolver and memoizes the first successful
//! resolution, so repeated accessor calls never re-read the descriptors.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::Settings;
use crate::core::build_vars::{derive_build_vars, is_built_in_product, BuildVars};
use crate::core::device::{resolve_device, Device};
use crate::core::parts::{
    base_parts, inherited_parts, product_specific_parts, subsystem_entry, system_component_parts,
    vendor_parts_list, Parts, PartsMerger, Subsystems,
};
use crate::core::schema::{ProductDescriptor, SchemaVersion};
use crate::error::ResolveError;
use crate::infra::filesystem::normalize_path;
use crate::infra::loader;

/// System capability metadata of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyscapInfo {
    pub product: String,
    pub api_version: Value,
    pub system_type: String,
    pub manufacturer_id: Value,
}

/// Result of resolving one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProduct {
    name: String,
    version: String,
    config_file: PathBuf,
    parts: Parts,
    build_vars: BuildVars,
    device: Option<Device>,
    syscap_info: SyscapInfo,
    product_build_path: Option<String>,
    excluded_parts: Vec<String>,
}

impl ResolvedProduct {
    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version of the descriptor
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Descriptor the product was resolved from
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Merged parts, exclusions removed
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Build variables
    pub fn build_vars(&self) -> &BuildVars {
        &self.build_vars
    }

    /// Bound device, if any
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    /// Syscap info
    pub fn syscap_info(&self) -> &SyscapInfo {
        &self.syscap_info
    }

    /// Product build directory, explicit or derived
    pub fn product_build_path(&self) -> Option<&str> {
        self.product_build_path.as_deref()
    }

    /// Parts dropped by the exclusion pass
    pub fn excluded_parts(&self) -> &[String] {
        &self.excluded_parts
    }

    /// Synthetic `product_{name}` subsystem pointing at the build path
    pub fn product_subsystem(&self) -> Subsystems {
        match self.product_build_path() {
            Some(path) => subsystem_entry(&format!("product_{}", self.name), path),
            None => Subsystems::new(),
        }
    }

    /// Product and device subsystems together
    pub fn subsystems(&self) -> Subsystems {
        let mut subsystems = self.product_subsystem();
        if let Some(device) = &self.device {
            subsystems.extend(device.subsystem());
        }
        subsystems
    }
}

/// Resolves one product descriptor
#[derive(Debug, Clone)]
pub struct ProductResolver {
    name: String,
    config_file: PathBuf,
    settings: Settings,
}

impl ProductResolver {
    /// Create a resolver for `name`, described by `config_file`
    pub fn new(name: impl Into<String>, config_file: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            name: name.into(),
            config_file: config_file.into(),
            settings,
        }
    }

    /// Product name under resolution
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor path
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Resolve the product
    ///
    /// Reads the descriptor and every file it references. Any failure
    /// aborts the whole resolution.
    pub fn resolve(&self) -> Result<ResolvedProduct, ResolveError> {
        tracing::info!(
            "Resolving product '{}' from {}",
            self.name,
            self.config_file.display()
        );

        let record = loader::load(&self.config_file)?;
        let descriptor = ProductDescriptor::from_record(record, &self.config_file)?;
        let version = descriptor.schema_version()?;

        let syscap_info = SyscapInfo {
            product: descriptor.product_name.clone().unwrap_or_default(),
            api_version: descriptor.api_version_or_default(),
            system_type: descriptor.os_level.clone().unwrap_or_default(),
            manufacturer_id: descriptor.manufacturer_id_or_default(),
        };

        self.check_product_name(&descriptor)?;

        let device = resolve_device(&descriptor, version, &self.settings, &self.config_file)?;
        let mut merger = self.merge_parts(&descriptor, version, device.as_ref())?;
        let build_vars =
            derive_build_vars(&descriptor, version, &self.config_file, &self.settings);
        let product_build_path = self.product_build_path(&descriptor, version);

        let excluded_parts = merger.remove_excluded();
        if !excluded_parts.is_empty() {
            tracing::info!("Excluded parts: {}", excluded_parts.join(", "));
        }

        let resolved = ResolvedProduct {
            name: self.name.clone(),
            version: version.to_string(),
            config_file: self.config_file.clone(),
            parts: merger.into_parts(),
            build_vars,
            device,
            syscap_info,
            product_build_path,
            excluded_parts,
        };
        tracing::debug!(
            "Resolved '{}': {} parts, {} build vars",
            resolved.name,
            resolved.parts.len(),
            resolved.build_vars.len()
        );
        Ok(resolved)
    }

    fn check_product_name(&self, descriptor: &ProductDescriptor) -> Result<(), ResolveError> {
        if descriptor.product_name.as_deref() == Some(self.name.as_str()) {
            return Ok(());
        }
        Err(ResolveError::ProductNameMismatch {
            expected: self.name.clone(),
            found: descriptor.product_name.clone(),
        })
    }

    /// Run the four merge layers
    fn merge_parts(
        &self,
        descriptor: &ProductDescriptor,
        version: SchemaVersion,
        device: Option<&Device>,
    ) -> Result<PartsMerger, ResolveError> {
        let mut merger = PartsMerger::new();
        if !version.defaults().resolves_parts {
            return Ok(merger);
        }
        let source_root = &self.settings.source_root;

        if descriptor.based_on_minimum_system() {
            let os_level = descriptor.os_level_or_default(version);
            merger.overlay(base_parts(&self.settings.base_dir, os_level)?);
            tracing::debug!("Base layer ({os_level}): {} parts", merger.len());
        }

        if let Some(inherit) = descriptor.inherit.as_deref().filter(|list| !list.is_empty()) {
            let layer = inherited_parts(inherit, source_root)?;
            tracing::debug!("Inherited layer: {} parts", layer.len());
            merger.overlay(layer);
        }

        if let Some(relative) = descriptor
            .system_component
            .as_deref()
            .filter(|path| !path.is_empty())
        {
            let added = merger.fill_missing(system_component_parts(relative, source_root)?);
            tracing::debug!("System component layer: {added} new parts");
        }

        let current = if version == SchemaVersion::V2 {
            descriptor.parts.clone().unwrap_or_default()
        } else {
            let mut current = PartsMerger::new();
            current.overlay(vendor_parts_list(&descriptor.raw));
            current.overlay(product_specific_parts(&self.name));
            if let Some(device) = device {
                current.overlay(device.specific_parts());
            }
            current.into_parts()
        };
        tracing::debug!("Product layer: {} parts", current.len());
        merger.overlay(current);

        Ok(merger)
    }

    /// Explicit `product_build_path`, else the descriptor directory for
    /// 3.0 products outside the built-in product directory
    fn product_build_path(
        &self,
        descriptor: &ProductDescriptor,
        version: SchemaVersion,
    ) -> Option<String> {
        if let Some(path) = descriptor
            .product_build_path
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            return Some(path.to_string());
        }
        if version != SchemaVersion::V3 || is_built_in_product(&self.config_file, &self.settings)
        {
            return None;
        }
        let config_file = normalize_path(&self.config_file);
        let source_root = normalize_path(&self.settings.source_root);
        let dir = config_file.parent()?;
        let relative = dir.strip_prefix(&source_root).unwrap_or(dir);
        Some(relative.to_string_lossy().into_owned())
    }
}

/// Resolution progress of a [`Product`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Nothing has been read yet
    Unparsed,
    /// A resolution succeeded and is cached
    Resolved,
}

/// A product whose resolution runs on first access and is then cached
///
/// A failed resolution is not cached; the next access retries it.
#[derive(Debug)]
pub struct Product {
    resolver: ProductResolver,
    resolved: OnceLock<ResolvedProduct>,
}

impl Product {
    /// Create an unresolved product
    pub fn new(resolver: ProductResolver) -> Self {
        Self {
            resolver,
            resolved: OnceLock::new(),
        }
    }

    /// Product name
    pub fn name(&self) -> &str {
        self.resolver.name()
    }

    /// Current state
    pub fn state(&self) -> ResolutionState {
        if self.resolved.get().is_some() {
            ResolutionState::Resolved
        } else {
            ResolutionState::Unparsed
        }
    }

    /// Resolve the product, or return the cached result
    pub fn resolve(&self) -> Result<&ResolvedProduct, ResolveError> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }
        let resolved = self.resolver.resolve()?;
        Ok(self.resolved.get_or_init(|| resolved))
    }

    /// Parts and build variables
    pub fn get_parts_and_build_vars(&self) -> Result<(&Parts, &BuildVars), ResolveError> {
        let resolved = self.resolve()?;
        Ok((resolved.parts(), resolved.build_vars()))
    }

    /// Bound device, if any
    pub fn get_device(&self) -> Result<Option<&Device>, ResolveError> {
        Ok(self.resolve()?.device())
    }

    /// Syscap info
    pub fn get_syscap_info(&self) -> Result<&SyscapInfo, ResolveError> {
        Ok(self.resolve()?.syscap_info())
    }
}
