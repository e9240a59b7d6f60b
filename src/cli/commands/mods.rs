//! Mods command - list the mods of one game

use crate::catalog::{Catalog, Mod};
use crate::cli::args::{ModsArgs, OutputFormat};
use crate::config::Config;
use crate::error::PackcacheResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the mods command
pub async fn execute(args: ModsArgs, config: &Config) -> PackcacheResult<()> {
    let catalog = Catalog::load(&config.catalog)?;
    let game = catalog.resolve(&args.game)?;

    match args.format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            if game.mods.is_empty() {
                ui::step_info(
                    &ctx,
                    &format!("No mods found in {}", game.mods_folder.display()),
                );
                return Ok(());
            }
            ui::intro(&ctx, &game.name);
            print_table(&game.mods);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&game.mods)?),
        OutputFormat::Plain => {
            for m in &game.mods {
                println!("{}", m.id);
            }
        }
    }

    Ok(())
}

fn print_table(mods: &[Mod]) {
    println!(
        "{:<30} {:<8} {:<8}",
        style("MOD").bold(),
        style("README").bold(),
        style("CONFIG").bold()
    );
    println!("{}", "-".repeat(48));

    let flag = |present: bool| if present { "yes" } else { "-" };
    for m in mods {
        println!(
            "{:<30} {:<8} {:<8}",
            m.id,
            flag(m.readme.is_some()),
            flag(m.config.is_some())
        );
    }

    println!();
    println!("{} mod(s)", mods.len());
}
