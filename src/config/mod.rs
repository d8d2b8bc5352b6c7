//! Configuration and constants
//!
//! - [`defaults`] - Built-in constants and the per-version default table
//! - [`settings`] - Source tree layout, loaded from TOML with env overrides

pub mod defaults;
pub mod settings;

pub use settings::Settings;
