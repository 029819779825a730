pub mod toml_config;

pub use toml_config::{ContractConfig, OutputRuleConfig};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "output-validation")]
#[command(about = "Check an HTTP output contract and validate responses against it")]
pub struct CliConfig {
    /// Path to the TOML contract file
    #[arg(short, long, default_value = "output-contract.toml")]
    pub config: String,

    /// JSON file holding a response ({"status", "headers", "body"}) to validate
    #[arg(short, long)]
    pub response: Option<String>,

    /// Stop at the first failing field instead of reporting all of them
    #[arg(long)]
    pub bail: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
