//! `ring`: run a full escalation episode against console ports.
//!
//! Lines on stdin act as the user gesture layer: `ack` acknowledges,
//! `cancel` (or EOF with `--auto-cancel`) stops the alarm.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use focusalarm_core::{EscalationConfig, EscalationService};

use crate::console::{ConsoleAudio, ConsoleStatus};

#[derive(Args)]
pub struct RingArgs {
    /// Path to a TOML config file (defaults used when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cancel automatically after this many seconds
    #[arg(long)]
    pub auto_cancel: Option<u64>,

    /// Print engine events as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RingArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => EscalationConfig::load(path)?,
        None => EscalationConfig::default(),
    };

    tracing::info!(
        "Ringing: {} ms cycles, beep every {} ms",
        config.level_duration_ms,
        config.beep_interval_ms
    );
    let handle = EscalationService::spawn(
        config,
        Arc::new(ConsoleAudio::default()),
        Arc::new(ConsoleStatus),
    );

    if args.json {
        let mut events = handle.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if let Ok(line) = serde_json::to_string(&event) {
                    println!("{line}");
                }
            }
        });
    }

    handle.start(false);

    if let Some(secs) = args.auto_cancel {
        let auto = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            auto.cancel();
        });
    }

    // stdin is the stand-in for the drag-to-confirm UI.
    let stdin_handle = handle.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match line.trim() {
                "ack" | "a" => stdin_handle.acknowledge(),
                "cancel" | "c" | "q" => stdin_handle.cancel(),
                "" => {}
                other => eprintln!("unknown input '{other}' (use: ack, cancel)"),
            }
        }
    });

    handle.terminated().await;
    Ok(())
}
