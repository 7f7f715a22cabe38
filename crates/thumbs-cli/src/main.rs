//! thumbs CLI entrypoint.

use clap::Parser;
use std::path::PathBuf;
use thumbs_core::ThumbsConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod handlers;

#[cfg(test)]
mod cli_tests;

use commands::{Commands, ConfigCommands};

#[derive(Parser)]
#[command(name = "thumbs")]
#[command(author, version, about = "On-demand image rendering cache", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $THUMBS_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);
    run(cli).await
}

/// Dispatch a parsed command. Configuration is loaded only by the commands
/// that need it.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let explicit = cli.config;
    let load = || ThumbsConfig::load(explicit.as_deref());

    match cli.command {
        Commands::Serve { listen } => handlers::serve(load()?, listen).await?,
        Commands::Render {
            action,
            geometry,
            source,
            out,
        } => handlers::render(&load()?, &action, &geometry, &source, out.as_deref()).await?,
        Commands::Url {
            source,
            action,
            geometry,
            width,
            height,
        } => handlers::url(&load()?, &source, &action, &geometry, width, height)?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&load()?)?,
            ConfigCommands::Path => handlers::config_path(explicit.as_deref()),
        },
    }

    Ok(())
}
