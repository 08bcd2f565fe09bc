use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::rdar::RdarCommands;
use commands::wem::WemCommands;

#[derive(Parser)]
#[command(name = "wwise-rdar")]
#[command(about = "Wwise WEM to Ogg Vorbis converter and RDAR archive tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// WEM Operations (Decode/Info)
    #[command(subcommand)]
    Wem(WemCommands),
    /// RDAR Operations (List/Single/Extract/ExtractWem)
    #[command(subcommand)]
    Rdar(RdarCommands),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Wem(cmd) => commands::wem::handle(cmd)?,
        Commands::Rdar(cmd) => commands::rdar::handle(cmd)?,
    }

    Ok(())
}
