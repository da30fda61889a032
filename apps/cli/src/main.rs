//! songpress CLI — song post generator.
//!
//! Aggregates song data from several online sources, merges it through a
//! text-generation service, and renders a publish-ready HTML post.

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
