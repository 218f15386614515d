//! `beep`: one-shot beep that tears itself down after the settle delay.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use focusalarm_core::{EscalationConfig, EscalationService};

use crate::console::{ConsoleAudio, ConsoleStatus};

#[derive(Args)]
pub struct BeepArgs {
    /// Path to a TOML config file (defaults used when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: BeepArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => EscalationConfig::load(path)?,
        None => EscalationConfig::default(),
    };

    let handle = EscalationService::spawn(
        config,
        Arc::new(ConsoleAudio::default()),
        Arc::new(ConsoleStatus),
    );
    handle.start(true);
    handle.terminated().await;
    Ok(())
}
