//! Games command - list the catalog

use crate::catalog::{Catalog, Game};
use crate::cli::args::{GamesArgs, OutputFormat};
use crate::config::Config;
use crate::error::PackcacheResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the games command
pub async fn execute(args: GamesArgs, config: &Config) -> PackcacheResult<()> {
    let catalog = Catalog::load(&config.catalog)?;

    match args.format {
        OutputFormat::Table => print_table(catalog.games()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries(catalog.games()))?),
        OutputFormat::Plain => {
            for game in catalog.games() {
                println!("{}", game.id);
            }
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct GameSummary<'a> {
    id: &'a str,
    name: &'a str,
    mods: usize,
    datafile_present: bool,
}

fn summaries(games: &[Game]) -> Vec<GameSummary<'_>> {
    games
        .iter()
        .map(|g| GameSummary {
            id: &g.id,
            name: &g.name,
            mods: g.mods.len(),
            datafile_present: g.original_datafile.is_file(),
        })
        .collect()
}

fn print_table(games: &[Game]) {
    let ctx = UiContext::detect();
    if games.is_empty() {
        ui::step_info(&ctx, "No games configured");
        return;
    }

    ui::intro(&ctx, "Games");
    println!(
        "{:<12} {:<32} {:<6} {:<10}",
        style("ID").bold(),
        style("NAME").bold(),
        style("MODS").bold(),
        style("DATAFILE").bold()
    );
    println!("{}", "-".repeat(62));

    for game in games {
        let datafile = if game.original_datafile.is_file() {
            style("ok").green()
        } else {
            style("missing").yellow()
        };
        println!(
            "{:<12} {:<32} {:<6} {:<10}",
            game.id,
            game.name,
            game.mods.len(),
            datafile
        );
    }

    println!();
    println!("{} game(s)", games.len());
}
