//! oaspages CLI: OpenAPI page rendering hooks for static-site builds.
//!
//! Each build lifecycle hook is a subcommand, so any CI runner can act as
//! the build host.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
