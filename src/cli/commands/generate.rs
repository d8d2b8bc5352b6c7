//! Generate command implementation
//!
//! Implements `hb-preloader generate` to write the preloader output files.

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::Context;
use crate::cli::output::{print_json, status};
use crate::core::outputs::write_outputs;
use crate::core::product::Product;

/// Execute the generate command
pub fn execute(ctx: &Context, product: &Product, output: Option<PathBuf>) -> Result<()> {
    let resolved = product.resolve()?;
    let dir = output.unwrap_or_else(|| ctx.settings.output_dir(resolved.name()));

    let outputs = write_outputs(resolved, &dir)
        .with_context(|| format!("Failed to write outputs for '{}'", resolved.name()))?;

    if ctx.output.json {
        let files: Vec<_> = outputs.all().iter().map(|p| p.display().to_string()).collect();
        return print_json(&files);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    println!(
        "{} Generated outputs for '{}' in {}",
        status::SUCCESS,
        resolved.name(),
        dir.display()
    );
    for path in outputs.all() {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(())
}
