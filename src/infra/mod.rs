//! Infrastructure layer
//!
//! Handles all filesystem I/O: reading descriptors and writing outputs.

pub mod filesystem;
pub mod loader;
