//! Game and mod descriptors
//!
//! Both are built once at startup and never change afterwards. Mods are
//! discovered by scanning the game's mods folder: every subdirectory is one
//! selectable mod, identified by its directory name without the extension
//! (`fast-karts.v2` is the mod `fast-karts`).

use crate::config::GameSpec;
use crate::error::{PackcacheError, PackcacheResult};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const README_FILE: &str = "README.md";
const CONFIG_FILE: &str = "config.json";

/// A game whose data file can be packed with mods
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    /// Identifier, possibly with a dotted variant suffix (`mhk_2.de`)
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// The unmodified data file handed to the packer
    pub original_datafile: PathBuf,
    /// Folder scanned for mods
    pub mods_folder: PathBuf,
    /// File name of the packed artifact
    pub out_filename: String,
    /// Mods found at load time, sorted by id
    pub mods: Vec<Mod>,
}

/// A selectable modification bundle
#[derive(Debug, Clone, Serialize)]
pub struct Mod {
    /// Directory name up to its extension
    pub id: String,
    /// Id of the game this mod belongs to
    pub game_id: String,
    /// Mod directory handed to the packer
    pub path: PathBuf,
    /// Contents of `README.md`, if present
    pub readme: Option<String>,
    /// Parsed `config.json`, if present
    pub config: Option<serde_json::Value>,
}

impl Game {
    /// Build a game from its catalog entry and scan its mods folder
    pub fn load(spec: &GameSpec, data_root: &Path, mods_root: &Path) -> PackcacheResult<Self> {
        let original_datafile = data_root.join(&spec.datafile);
        let mods_folder = mods_root.join(spec.mods_folder.as_deref().unwrap_or(Path::new(&spec.id)));
        let out_filename = match &spec.out_filename {
            Some(name) => name.clone(),
            None => spec
                .datafile
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| PackcacheError::ConfigInvalid {
                    path: spec.datafile.clone(),
                    reason: format!("game `{}` has no output file name", spec.id),
                })?,
        };

        let mods = discover_mods(&spec.id, &mods_folder)?;
        debug!("Loaded game {} with {} mods", spec.id, mods.len());

        Ok(Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            original_datafile,
            mods_folder,
            out_filename,
            mods,
        })
    }

    /// Identifier understood by the packer: the id up to the first `.`
    pub fn packer_id(&self) -> &str {
        self.id.split('.').next().unwrap_or(&self.id)
    }

    /// Look up a mod by id (the first, if several directories share it)
    pub fn find_mod(&self, id: &str) -> Option<&Mod> {
        self.mods.iter().find(|m| m.id == id)
    }

    /// Known mods whose ids appear in `ids`, in the game's order
    ///
    /// Every directory carrying a requested id is selected once.
    pub fn select_mods<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Mod> {
        let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        self.mods
            .iter()
            .filter(|m| wanted.contains(m.id.as_str()))
            .collect()
    }
}

impl Mod {
    /// Read a mod directory, picking up its optional readme and config
    fn load(game_id: &str, path: PathBuf) -> PackcacheResult<Self> {
        let id = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let readme_path = path.join(README_FILE);
        let readme = if readme_path.is_file() {
            Some(fs::read_to_string(&readme_path).map_err(|e| {
                PackcacheError::io(format!("reading {}", readme_path.display()), e)
            })?)
        } else {
            None
        };

        let config_path = path.join(CONFIG_FILE);
        let config = if config_path.is_file() {
            let bytes = fs::read(&config_path).map_err(|e| {
                PackcacheError::io(format!("reading {}", config_path.display()), e)
            })?;
            let value = serde_json::from_slice(&bytes).map_err(|e| {
                PackcacheError::ModConfigInvalid {
                    path: config_path.clone(),
                    reason: e.to_string(),
                }
            })?;
            Some(value)
        } else {
            None
        };

        Ok(Self {
            id,
            game_id: game_id.to_string(),
            path,
            readme,
            config,
        })
    }
}

/// Scan a mods folder; a missing folder simply has no mods
fn discover_mods(game_id: &str, folder: &Path) -> PackcacheResult<Vec<Mod>> {
    if !folder.is_dir() {
        debug!("No mods folder at {}", folder.display());
        return Ok(vec![]);
    }

    let entries = fs::read_dir(folder)
        .map_err(|e| PackcacheError::io(format!("reading mods folder {}", folder.display()), e))?;

    let mut mods = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackcacheError::io("reading mods folder entry", e))?;
        let path = entry.path();
        if path.is_dir() {
            mods.push(Mod::load(game_id, path)?);
        }
    }

    mods.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    Ok(mods)
}
