use anyhow::{Context, Result};
use clap::Parser;
use simple_logger::SimpleLogger;

mod cli;
mod result;
mod runner;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    SimpleLogger::new()
        .with_level(cli.log_level())
        .env()
        .init()
        .context("cannot install logger")?;

    let outcome = runner::run(&cli)?;
    outcome.analyze(&cli)
}
