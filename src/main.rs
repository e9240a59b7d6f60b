//! packcache CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use packcache::cli::{Cli, Commands};
use packcache::config::{Config, ConfigManager};
use packcache::error::PackcacheResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PackcacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Games(args) => packcache::cli::commands::games(args, &config).await,
        Commands::Mods(args) => packcache::cli::commands::mods(args, &config).await,
        Commands::Pack(args) => packcache::cli::commands::pack(args, &config).await,
        Commands::Serve => packcache::cli::commands::serve(&config).await,
        Commands::Config(args) => {
            packcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logging goes to stderr: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("packcache=warn"),
        1 => EnvFilter::new("packcache=info"),
        _ => EnvFilter::new("packcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
