//! hb-preloader - product configuration resolver
//!
//! Entry point for the hb-preloader command-line application.

use clap::Parser;

use hb_preloader::cli::output::display_error;
use hb_preloader::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber; RUST_LOG directives take precedence
    let level = cli.output_config().log_level();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    // Run the command and handle errors
    if let Err(e) = cli.run() {
        display_error(&e);
        std::process::exit(1);
    }
}
