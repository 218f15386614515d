//! `config`: inspect the engine timing configuration.

use std::path::PathBuf;

use clap::Subcommand;

use focusalarm_core::EscalationConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        /// Path to a TOML config file (defaults used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { config } => {
            let config = match &config {
                Some(path) => EscalationConfig::load(path)?,
                None => EscalationConfig::default(),
            };
            print!("{}", config.to_toml_string());
            Ok(())
        }
    }
}
