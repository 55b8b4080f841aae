mod analysis;
mod analyzer;
mod cli;
mod config;
mod error;
mod output;
mod patterns;
mod platforms;
mod scoring;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting TestLens - CI Test Signal Analyzer");
    cli.execute()?;

    Ok(())
}
