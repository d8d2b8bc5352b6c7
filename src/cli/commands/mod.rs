//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod generate;
pub mod list;
pub mod resolve;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::cli::output::OutputConfig;
use crate::config::Settings;
use crate::core::product::{Product, ProductResolver};
use crate::core::products::find_product_config;

/// State shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub output: OutputConfig,
}

impl Context {
    /// Build a lazily resolved product
    ///
    /// `config_file` overrides descriptor discovery.
    pub fn product(&self, name: &str, config_file: Option<PathBuf>) -> Result<Product> {
        let config_file = match config_file {
            Some(path) => path,
            None => find_product_config(name, &self.settings)?,
        };
        tracing::debug!("Using product descriptor {}", config_file.display());
        Ok(Product::new(ProductResolver::new(
            name,
            config_file,
            self.settings.clone(),
        )))
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a product and print the full result
    Resolve {
        /// Product name
        product: String,

        /// Product descriptor (skips discovery)
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// Print the merged parts of a product
    Parts {
        /// Product name
        product: String,

        /// Product descriptor (skips discovery)
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// Print the resolved device of a product
    Device {
        /// Product name
        product: String,

        /// Product descriptor (skips discovery)
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// Print the system capability info of a product
    Syscap {
        /// Product name
        product: String,

        /// Product descriptor (skips discovery)
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// Resolve a product and write the preloader output files
    Generate {
        /// Product name
        product: String,

        /// Product descriptor (skips discovery)
        #[arg(long)]
        config_file: Option<PathBuf>,

        /// Output directory (defaults to out/preloader/<product>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the products found in the source tree
    List,
}

impl Commands {
    /// Execute the command
    pub fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Resolve {
                product,
                config_file,
            } => {
                tracing::info!("Resolving product '{product}'");
                resolve::execute(ctx, &ctx.product(&product, config_file)?)
            }
            Self::Parts {
                product,
                config_file,
            } => resolve::execute_parts(ctx, &ctx.product(&product, config_file)?),
            Self::Device {
                product,
                config_file,
            } => resolve::execute_device(ctx, &ctx.product(&product, config_file)?),
            Self::Syscap {
                product,
                config_file,
            } => resolve::execute_syscap(ctx, &ctx.product(&product, config_file)?),
            Self::Generate {
                product,
                config_file,
                output,
            } => {
                tracing::info!("Generating outputs for product '{product}'");
                generate::execute(ctx, &ctx.product(&product, config_file)?, output)
            }
            Self::List => list::execute(ctx),
        }
    }
}
