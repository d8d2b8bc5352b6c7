//! hb-preloader - product configuration resolver
//!
//! This library resolves a product descriptor, together with the device,
//! base system, inherited and system-component descriptors it references,
//! into one de-duplicated part manifest and a flat set of build variables.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Resolution logic
//! - [`infra`] - Infrastructure layer (descriptor reads, output writes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use hb_preloader::config::Settings;
//! use hb_preloader::core::product::{Product, ProductResolver};
//!
//! let settings = Settings::from_root("/path/to/source");
//! let config = settings.vendor_dir.join("rockchip/rk3568/config.json");
//! let product = Product::new(ProductResolver::new("rk3568", config, settings));
//! let (parts, build_vars) = product.get_parts_and_build_vars()?;
//! println!("{} parts, os_level={}", parts.len(), build_vars["os_level"]);
//! # Ok::<(), hb_preloader::error::ResolveError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
