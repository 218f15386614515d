use clap::{Parser, Subcommand};

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "focusalarm-cli", version, about = "Focusalarm CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ring the alarm with escalating urgency until acknowledged/cancelled
    Ring(commands::ring::RingArgs),
    /// Play a single beep and exit
    Beep(commands::beep::BeepArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Ring(args) => commands::ring::run(args).await,
        Commands::Beep(args) => commands::beep::run(args).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    // The stdin reader task may still be parked in a blocking read;
    // exit instead of waiting for it.
    std::process::exit(0);
}
