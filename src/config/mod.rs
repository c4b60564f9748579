pub mod network;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fundme")]
#[command(about = "Crowdfunding service with a USD-denominated minimum contribution")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "fundme.toml")]
    pub config: String,

    /// Override the network from the config file
    #[arg(long)]
    pub network: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the price feed version
    Version,
    /// Show the USD value of an amount and whether it meets the minimum
    Quote {
        /// Amount in whole native units, e.g. 0.1
        amount: String,
    },
    /// Run a JSON script of fund/withdraw steps and print the report
    Replay {
        /// Path to the JSON script
        script: String,
    },
}
