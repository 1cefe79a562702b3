use clap::Parser;
use packbridge_config::SettingsLoader;
use std::path::PathBuf;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "packbridge")]
#[command(about = "Build and precompile bundles through a webpack build service", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON settings file (PACKBRIDGE_* environment variables override it)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    packbridge_utils::tracing::init().map_err(|e| eyre::eyre!("failed to initialize logging: {e}"))?;

    let cli = Cli::parse();

    let loaded = SettingsLoader::load(cli.settings.as_deref())?;
    tracing::debug!(sources = ?loaded.sources, "loaded settings");

    cli.command.execute(loaded.settings).await
}
