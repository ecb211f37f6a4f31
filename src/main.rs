mod cli;
mod config;
mod detect;
mod error;
mod hours;
mod monitor;
mod server;
mod siren;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting sirenwatch");
    cli.execute().await?;

    Ok(())
}
