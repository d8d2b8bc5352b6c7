//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no resolution logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::Settings;
use commands::{Commands, Context};
use output::OutputConfig;

/// hb-preloader - product configuration resolver
///
/// Resolves product descriptors into parts, build variables and devices.
#[derive(Parser, Debug)]
#[command(name = "hb-preloader")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Source root of the tree
    #[arg(long, global = true, env = "HB_SOURCE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Settings file (defaults to .hb-preloader.toml in the source root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output preferences from the global flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        let settings = Settings::load(&self.root, self.config.as_deref())
            .with_context(|| format!("Failed to load settings for {}", self.root.display()))?;
        tracing::debug!("Using source root {}", settings.source_root.display());

        let ctx = Context {
            settings,
            output: OutputConfig::new(self.quiet, self.json, self.verbose),
        };
        command.run(&ctx)
    }
}
