//! Core resolution logic
//!
//! Turns a product descriptor hierarchy into parts, build variables and a
//! device binding. Descriptor reads go through [`crate::infra::loader`].
//!
//! # Submodules
//!
//! - [`schema`] - Schema versions and the typed product descriptor
//! - [`parts`] - Part sources and the layered merge
//! - [`device`] - Device resolution
//! - [`build_vars`] - Build variable derivation
//! - [`product`] - Product resolution and memoization
//! - [`outputs`] - Preloader output files
//! - [`products`] - Product discovery

pub mod build_vars;
pub mod device;
pub mod outputs;
pub mod parts;
pub mod product;
pub mod products;
pub mod schema;
