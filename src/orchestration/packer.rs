//! Packer abstraction and the orchestrator that drives it
//!
//! The orchestrator turns a cache miss into a packed file: it validates the
//! selection, runs the packer once and checks both the exit status and the
//! presence of the output file. Registering the artifact is left to the caller.

use crate::catalog::{Game, Mod};
use crate::error::{PackcacheError, PackcacheResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Subcommand understood by the external packer
pub const PACK_SUBCOMMAND: &str = "packmod";

/// Everything the packer needs for one invocation
#[derive(Debug, Clone)]
pub struct PackRequest<'a> {
    /// Game id without its variant suffix
    pub game_id: &'a str,
    /// Unmodified game data file
    pub datafile: &'a Path,
    /// Where the packed file must be written
    pub output: &'a Path,
    /// Mod directories, in the order they are applied
    pub mod_paths: Vec<&'a Path>,
}

impl<'a> PackRequest<'a> {
    /// Build the request for packing `mods` into `output`
    pub fn new(game: &'a Game, output: &'a Path, mods: &[&'a Mod]) -> Self {
        Self {
            game_id: game.packer_id(),
            datafile: &game.original_datafile,
            output,
            mod_paths: mods.iter().map(|m| m.path.as_path()).collect(),
        }
    }

    /// Argument vector after the binary: `packmod <game> <datafile> <output> <mod>...`
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            PACK_SUBCOMMAND.into(),
            self.game_id.into(),
            self.datafile.into(),
            self.output.into(),
        ];
        args.extend(self.mod_paths.iter().map(|p| p.as_os_str().to_os_string()));
        args
    }
}

/// Captured outcome of one packer run
#[derive(Debug, Clone, Default)]
pub struct PackResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl PackResult {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run a pack
///
/// Implementations report the raw outcome; judging it is the orchestrator's job.
#[async_trait]
pub trait Packer: Send + Sync {
    /// Run one pack and capture its output
    async fn pack(&self, request: &PackRequest<'_>) -> PackcacheResult<PackResult>;

    /// Human-readable packer name for display
    fn packer_name(&self) -> String;
}

/// Runs a packer for cache misses and validates the result
#[derive(Clone)]
pub struct PackOrchestrator {
    packer: Arc<dyn Packer>,
}

impl PackOrchestrator {
    /// Create an orchestrator around a packer
    pub fn new(packer: Arc<dyn Packer>) -> Self {
        Self { packer }
    }

    /// Pack `selected` mods for `game` into `output_path`
    ///
    /// Succeeds only if the packer exits with zero and `output_path` exists
    /// afterwards. Runs the packer exactly once.
    pub async fn run(
        &self,
        game: &Game,
        output_path: &Path,
        selected: &[&Mod],
    ) -> PackcacheResult<PackResult> {
        if selected.is_empty() {
            return Err(PackcacheError::NoValidModsSelected {
                game: game.id.clone(),
            });
        }

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                PackcacheError::io(format!("creating output directory {}", parent.display()), e)
            })?;
        }

        let request = PackRequest::new(game, output_path, selected);
        info!(
            "Packing {} mod(s) for {} with {}",
            selected.len(),
            game.id,
            self.packer.packer_name()
        );

        let result = self.packer.pack(&request).await?;
        debug!(
            "Packer exited with {:?} ({} bytes stdout, {} bytes stderr)",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        if !result.success() {
            return Err(PackcacheError::packer_failed(result.exit_code, &result.stderr));
        }

        if !output_path.exists() {
            return Err(PackcacheError::PackerOutputMissing(output_path.to_path_buf()));
        }

        Ok(result)
    }
}
