//! List command implementation
//!
//! Implements `hb-preloader list` to show the products of the source tree.

use anyhow::Result;

use super::Context;
use crate::cli::output::{print_json, status};
use crate::core::products::discover_products;

/// Execute the list command
pub fn execute(ctx: &Context) -> Result<()> {
    let products = discover_products(&ctx.settings);

    if ctx.output.json {
        return print_json(&products);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    if products.is_empty() {
        println!(
            "{} No products found under {}",
            status::WARNING,
            ctx.settings.source_root.display()
        );
        return Ok(());
    }

    let width = products.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut company = None;
    for product in &products {
        if company != Some(&product.company) {
            println!("{}:", product.company);
            company = Some(&product.company);
        }
        println!(
            "  {:<width$}  {}  {}",
            product.name,
            product.version,
            product.path.display()
        );
    }
    Ok(())
}
