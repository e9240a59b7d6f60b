//! Pack command - pack mods once and print the artifact path

use crate::cli::args::PackArgs;
use crate::config::Config;
use crate::error::{PackcacheError, PackcacheResult};
use crate::service::PackService;
use crate::ui::{self, TaskSpinner, UiContext};
use tracing::debug;

/// Execute the pack command
pub async fn execute(args: PackArgs, config: &Config) -> PackcacheResult<()> {
    let ctx = UiContext::detect();
    let service = PackService::from_config(config)?;
    let game = service.resolve(&args.game)?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Packing {} for {}...", args.mods.join(", "), game.name));

    let artifact = match service.lookup_or_pack(game, &args.mods).await {
        Ok(artifact) => {
            spinner.stop(if artifact.cached {
                "Served from cache"
            } else {
                "Packed"
            });
            artifact
        }
        Err(e) => {
            spinner.stop_error("Packing failed");
            return Err(e);
        }
    };

    ui::key_value(&ctx, "Key", artifact.key.as_str());

    if let Some(dest) = &args.output {
        debug!("Copying {} to {}", artifact.path.display(), dest.display());
        tokio::fs::copy(&artifact.path, dest).await.map_err(|e| {
            PackcacheError::io(format!("copying artifact to {}", dest.display()), e)
        })?;
        ui::step_ok_detail(&ctx, "Copied packed file", &dest.display().to_string());
    }

    println!("{}", artifact.path.display());
    Ok(())
}
