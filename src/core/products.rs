//! Product discovery
//!
//! Finds the product descriptors of a source tree: `config.json` files below
//! the vendor directory and `*.json` files in the built-in product directory.

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    DEFAULT_SCHEMA_VERSION, VENDOR_CONFIG_FILE_NAME, VENDOR_SEARCH_DEPTH,
};
use crate::config::Settings;
use crate::core::build_vars::vendor_company;
use crate::error::ResolveError;
use crate::infra::loader;

/// Company label of built-in products
pub const BUILT_IN_COMPANY: &str = "built-in";

/// A discoverable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductEntry {
    pub name: String,
    pub company: String,
    pub path: PathBuf,
    pub version: String,
}

/// List every product of the tree, sorted by company then name
///
/// Unreadable descriptors are skipped.
pub fn discover_products(settings: &Settings) -> Vec<ProductEntry> {
    let mut entries = Vec::new();

    for path in vendor_configs(&settings.vendor_dir) {
        let company = vendor_company(&path, &settings.vendor_dir)
            .unwrap_or_else(|| BUILT_IN_COMPANY.to_string());
        if let Some(entry) = read_entry(&path, company) {
            entries.push(entry);
        }
    }

    for path in built_in_configs(&settings.product_dir) {
        if let Some(entry) = read_entry(&path, BUILT_IN_COMPANY.to_string()) {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| (&a.company, &a.name).cmp(&(&b.company, &b.name)));
    entries
}

/// Locate the descriptor of `name`
///
/// `<product_dir>/<name>.json` wins over vendor products.
pub fn find_product_config(name: &str, settings: &Settings) -> Result<PathBuf, ResolveError> {
    let built_in = settings.product_dir.join(format!("{name}.json"));
    if built_in.is_file() {
        return Ok(built_in);
    }

    vendor_configs(&settings.vendor_dir)
        .into_iter()
        .find(|path| {
            read_entry(path, String::new()).is_some_and(|entry| entry.name == name)
        })
        .ok_or(ResolveError::ConfigNotFound { path: built_in })
}

fn vendor_configs(vendor_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(vendor_dir)
        .max_depth(VENDOR_SEARCH_DEPTH)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == VENDOR_CONFIG_FILE_NAME)
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();
    paths
}

fn built_in_configs(product_dir: &Path) -> Vec<PathBuf> {
    let Ok(read_dir) = std::fs::read_dir(product_dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    paths
}

fn read_entry(path: &Path, company: String) -> Option<ProductEntry> {
    let record = match loader::load(path) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Skipping product descriptor: {e}");
            return None;
        }
    };
    let name = record.get("product_name").and_then(Value::as_str)?;
    let version = record
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SCHEMA_VERSION);
    Some(ProductEntry {
        name: name.to_string(),
        company,
        path: path.to_path_buf(),
        version: version.to_string(),
    })
}
