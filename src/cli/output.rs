//! Output formatting
//!
//! Shared helpers for printing results, JSON output and errors.

use serde::Serialize;
use tracing::Level;

use crate::error::ResolveError;

/// Output preferences from the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything but errors
    pub quiet: bool,
    /// Print machine-readable JSON
    pub json: bool,
    /// Verbosity count (-v, -vv)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create from the global flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default log level for the tracing subscriber
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error chain to stderr
///
/// Resolution errors also show their kind, status code and a suggested fix.
pub fn display_error(err: &anyhow::Error) {
    eprintln!("{} Error: {err}", status::ERROR);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
    if let Some(resolve) = err.chain().find_map(|e| e.downcast_ref::<ResolveError>()) {
        let kind = resolve.kind();
        eprintln!("  kind: {kind} [{}]", kind.code());
        eprintln!("  solution: {}", kind.solution());
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(OutputConfig::new(false, false, 0).log_level(), Level::WARN);
        assert_eq!(OutputConfig::new(false, false, 1).log_level(), Level::INFO);
        assert_eq!(OutputConfig::new(false, false, 3).log_level(), Level::DEBUG);
        assert_eq!(OutputConfig::new(true, false, 2).log_level(), Level::ERROR);
    }
}
