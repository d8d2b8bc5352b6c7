//! Resolve command implementations
//!
//! Implements `hb-preloader resolve`, `parts`, `device` and `syscap`.

use anyhow::Result;
use serde_json::Value;

use super::Context;
use crate::cli::output::{print_json, status};
use crate::core::product::Product;

/// Execute the resolve command
pub fn execute(ctx: &Context, product: &Product) -> Result<()> {
    let resolved = product.resolve()?;

    if ctx.output.json {
        return print_json(resolved);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    println!(
        "{} Resolved '{}' (version {})",
        status::SUCCESS,
        resolved.name(),
        resolved.version()
    );
    println!("  Descriptor: {}", resolved.config_file().display());
    match resolved.device() {
        Some(device) => println!("  Device: {}", device.name()),
        None => println!("  Device: none"),
    }
    if let Some(path) = resolved.product_build_path() {
        println!("  Build path: {path}");
    }
    println!("  Parts: {}", resolved.parts().len());
    for part in resolved.excluded_parts() {
        println!("  {} Excluded {part}", status::INFO);
    }

    println!("\nBuild variables:");
    for (key, value) in resolved.build_vars() {
        println!("  {key} = {}", render(value));
    }
    Ok(())
}

/// Execute the parts command
pub fn execute_parts(ctx: &Context, product: &Product) -> Result<()> {
    let (parts, _) = product.get_parts_and_build_vars()?;

    if ctx.output.json {
        return print_json(parts);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    for (key, features) in parts {
        if features.is_empty() {
            println!("{key}");
        } else {
            let rendered: Vec<String> = features
                .iter()
                .map(|(name, value)| format!("{name}={}", render(value)))
                .collect();
            println!("{key} [{}]", rendered.join(", "));
        }
    }
    Ok(())
}

/// Execute the device command
pub fn execute_device(ctx: &Context, product: &Product) -> Result<()> {
    let device = product.get_device()?;

    if ctx.output.json {
        return print_json(&device);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    let Some(device) = device else {
        println!("{} '{}' has no device", status::INFO, product.name());
        return Ok(());
    };
    println!("Device: {}", device.name());
    if let Some(info) = device.device_info() {
        for (key, value) in info {
            println!("  {key} = {}", render(value));
        }
    }
    Ok(())
}

/// Execute the syscap command
pub fn execute_syscap(ctx: &Context, product: &Product) -> Result<()> {
    let syscap = product.get_syscap_info()?;

    if ctx.output.json {
        return print_json(syscap);
    }
    if ctx.output.quiet {
        return Ok(());
    }

    println!("product: {}", syscap.product);
    println!("api_version: {}", render(&syscap.api_version));
    println!("system_type: {}", syscap.system_type);
    println!("manufacturer_id: {}", render(&syscap.manufacturer_id));
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_strings_unquoted() {
        assert_eq!(render(&json!("ohos")), "ohos");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!(null)), "null");
    }
}
