use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gce-pricing", version, about = "Compute Engine pricing normalizer and lookup API")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load the pricing dataset and serve the HTTP API (default)
    Serve {
        /// Dataset file to load instead of the configured one
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Port to listen on instead of the configured one
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },

    /// Normalize raw pricing-table descriptors into the canonical dataset
    Normalize {
        /// JSON array of raw table descriptors
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the canonical dataset
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look up the cost of a CPU/memory shape in one region
    Cost {
        /// Number of vCPUs
        #[arg(long)]
        cpus: u32,

        /// Memory in whole GB
        #[arg(long)]
        memory: u32,

        /// Region code, e.g. useast1
        #[arg(long)]
        region: String,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate the configuration and the dataset it points to
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            dataset: None,
            port: None,
        })
    }
}
