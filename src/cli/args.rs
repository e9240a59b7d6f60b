//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// packcache - pack game mods and cache the results
///
/// Runs an external packer to merge selected mods into a game's data file,
/// reusing earlier results for identical requests.
#[derive(Parser, Debug)]
#[command(name = "packcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PACKCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known games
    Games(GamesArgs),

    /// List the mods available for a game
    Mods(ModsArgs),

    /// Pack mods into a game's data file
    Pack(PackArgs),

    /// Answer pack requests read line by line from stdin
    Serve,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the games command
#[derive(Parser, Debug)]
pub struct GamesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the mods command
#[derive(Parser, Debug)]
pub struct ModsArgs {
    /// Game id (e.g. mhk_2.en)
    pub game: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the pack command
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Game id (e.g. mhk_2.en)
    pub game: String,

    /// Mod ids to include (order does not matter)
    #[arg(required = true)]
    pub mods: Vec<String>,

    /// Copy the packed file here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON
    Json,
    /// One id per line
    Plain,
}
