//! Error types for hb-preloader
//!
//! Domain-specific error types using thiserror.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure categories of a product resolution
///
/// Every [`ResolveError`] maps to exactly one kind so that callers can
/// report failures (exit codes, hints) without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced descriptor file does not exist
    ConfigNotFound,
    /// A descriptor could not be decoded
    ConfigMalformed,
    /// Product or device name disagrees with the descriptor
    SchemaMismatch,
    /// A field required by the active schema version is absent
    MissingRequiredField,
    /// The descriptor declares an unknown schema version
    UnsupportedVersion,
}

impl ErrorKind {
    /// Stable status code for this kind
    pub fn code(self) -> &'static str {
        match self {
            Self::ConfigNotFound => "4001",
            Self::ConfigMalformed => "4002",
            Self::SchemaMismatch => "4003",
            Self::MissingRequiredField => "4004",
            Self::UnsupportedVersion => "4005",
        }
    }

    /// Suggested fix shown to the user
    pub fn solution(self) -> &'static str {
        match self {
            Self::ConfigNotFound => {
                "Check that the product exists and that every path in 'inherit', \
                 'system_component' and the device config directory is correct"
            }
            Self::ConfigMalformed => "Fix the JSON syntax or field types of the reported file",
            Self::SchemaMismatch => {
                "Make 'product_name' (or 'device_name') in the descriptor match the file it lives in"
            }
            Self::MissingRequiredField => "Add the reported field to the product descriptor",
            Self::UnsupportedVersion => "Set 'version' to one of \"1.0\", \"2.0\" or \"3.0\"",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigNotFound => "ConfigNotFound",
            Self::ConfigMalformed => "ConfigMalformed",
            Self::SchemaMismatch => "SchemaMismatch",
            Self::MissingRequiredField => "MissingRequiredField",
            Self::UnsupportedVersion => "UnsupportedVersion",
        };
        f.write_str(name)
    }
}

/// Product resolution errors
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Referenced file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// File exists but is not a valid descriptor
    #[error("Failed to parse configuration '{path}': {error}")]
    ConfigMalformed { path: PathBuf, error: String },

    /// Descriptor's product_name differs from the product under resolution
    #[error("Product name configuration incorrect for '{expected}': descriptor declares {found:?}")]
    ProductNameMismatch {
        expected: String,
        found: Option<String>,
    },

    /// Device descriptor's device_name differs from the requested device
    #[error("Device name configuration incorrect in '{path}': expected '{expected}', found {found:?}")]
    DeviceNameMismatch {
        path: PathBuf,
        expected: String,
        found: Option<String>,
    },

    /// Field required by the schema version is absent
    #[error("Product descriptor '{path}' is missing required field '{field}'")]
    MissingRequiredField { path: PathBuf, field: String },

    /// Unknown schema version
    #[error("Unsupported product config version '{version}'")]
    UnsupportedVersion { version: String },
}

impl ResolveError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. } => ErrorKind::ConfigNotFound,
            Self::ConfigMalformed { .. } => ErrorKind::ConfigMalformed,
            Self::ProductNameMismatch { .. } | Self::DeviceNameMismatch { .. } => {
                ErrorKind::SchemaMismatch
            }
            Self::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            Self::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
        }
    }
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to serialize output
    #[error("Failed to serialize '{path}': {error}")]
    Serialize { path: PathBuf, error: String },
}

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Top-level preloader error type
#[derive(Error, Debug)]
pub enum PreloaderError {
    /// Resolution error
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
