//! harpnote CLI - practice shell, offline renderer and hole charts.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harpnote")]
#[command(author, version, about = "Harmonica practice tool", long_about = None)]
struct Cli {
    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play, record and replay notes from an interactive shell
    Practice(commands::practice::PracticeArgs),

    /// Render a written take to a WAV file
    Render(commands::render::RenderArgs),

    /// Print the hole chart for a key
    Layout(commands::layout::LayoutArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Practice(args) => commands::practice::run(args, config),
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Layout(args) => commands::layout::run(args, config),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
