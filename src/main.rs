use anyhow::Result;
use clap::Parser;
use std::path::Path;

mod cli;
mod commands;

use gce_pricing::{config, init_tracing};

/// Load configuration and initialize logging from it
fn setup(config_path: &Path) -> Result<config::Config> {
    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server);
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    match args.get_command() {
        cli::Commands::Serve { dataset, port } => {
            let cfg = setup(&args.config)?;
            commands::serve::execute(cfg, dataset, port).await?;
        }
        cli::Commands::Normalize { input, output } => {
            let cfg = setup(&args.config)?;
            commands::normalize::execute(&cfg, input, output)?;
        }
        cli::Commands::Cost {
            cpus,
            memory,
            region,
        } => {
            let cfg = setup(&args.config)?;
            commands::cost::execute(&cfg, cpus, memory, &region)?;
        }
        cli::Commands::Config { action } => {
            let cfg = setup(&args.config)?;
            match action {
                cli::ConfigCommands::Show => commands::config::show(&cfg)?,
                cli::ConfigCommands::Validate => commands::config::validate(&cfg)?,
            }
        }
        cli::Commands::Version => {
            println!("gce-pricing v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
