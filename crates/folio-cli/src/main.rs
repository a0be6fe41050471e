mod commands;
mod progress;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", about = "Pyramid viewer for very large scans")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Viewer config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image dimensions, raw layout and planned pyramid levels
    Info(commands::info::InfoArgs),
    /// Build the pyramid and write every level as PNG
    Pyramid(commands::pyramid::PyramidArgs),
    /// Render a zoomed/panned view to PNG without a window
    Render(commands::render::RenderArgs),
    /// Print or save the default viewer config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Info(args) => commands::info::run(args, config_path),
        Commands::Pyramid(args) => commands::pyramid::run(args, config_path),
        Commands::Render(args) => commands::render::run(args, config_path),
        Commands::Config(args) => commands::config::run(args, config_path),
    }
}
