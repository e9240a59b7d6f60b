//! Configuration schema for packcache
//!
//! Configuration is stored at `~/.config/packcache/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// External packer settings
    pub packer: PackerConfig,

    /// Artifact cache settings
    pub cache: CacheConfig,

    /// Known games and where their files live
    pub catalog: CatalogConfig,
}

impl Config {
    /// Check values that deserialize fine but cannot work at runtime
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.max_entries == 0 {
            return Err("cache.max_entries must be at least 1".to_string());
        }

        let mut seen = HashSet::new();
        for game in &self.catalog.games {
            if game.id.is_empty() {
                return Err("catalog game with empty id".to_string());
            }
            if game.id.contains('\0') {
                return Err(format!("catalog game id {:?} contains a NUL byte", game.id));
            }
            if game.id.starts_with('.') {
                return Err(format!("catalog game id `{}` has no packer id", game.id));
            }
            if !seen.insert(game.id.as_str()) {
                return Err(format!("duplicate catalog game id `{}`", game.id));
            }
        }

        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// External packer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Packer executable (name on PATH or absolute path)
    pub binary: PathBuf,

    /// Arguments placed before `packmod`, e.g. a script when `binary` is an interpreter
    pub leading_args: Vec<String>,

    /// Upper bound on a single packer run in seconds (0 = unbounded)
    pub timeout_secs: u64,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(if cfg!(windows) { "idlemod.exe" } else { "idlemod" }),
            leading_args: vec![],
            timeout_secs: 300,
        }
    }
}

/// Artifact cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory owned by the cache; wiped on startup
    pub root_dir: PathBuf,

    /// Maximum number of cached artifacts
    pub max_entries: usize,

    /// Evict artifacts not accessed for this many seconds
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root_dir: std::env::temp_dir().join("packcache"),
            max_entries: 10,
            max_age_secs: 3600,
        }
    }
}

/// Game catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding the original data files
    pub data_root: PathBuf,

    /// Directory holding one mods folder per game
    pub mods_root: PathBuf,

    /// Known games, in listing order
    pub games: Vec<GameSpec>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let game = |id: &str, name: &str, datafile: &str, mods: Option<&str>, out: &str| GameSpec {
            id: id.to_string(),
            name: name.to_string(),
            datafile: PathBuf::from(datafile),
            mods_folder: mods.map(PathBuf::from),
            out_filename: Some(out.to_string()),
        };

        Self {
            data_root: PathBuf::from("data"),
            mods_root: PathBuf::from("mods"),
            games: vec![
                game("mhk_1", "Moorhuhn Kart: Extra (XXL)", "mhk_1.dat", None, "mhke.dat"),
                game(
                    "mhk_2.en",
                    "Moorhuhn Kart 2 (English)",
                    "mhk_2.en.dat",
                    Some("mhk_2"),
                    "mhk2-00.dat",
                ),
                game(
                    "mhk_2.de",
                    "Moorhuhn Kart 2 (German)",
                    "mhk_2.de.dat",
                    Some("mhk_2"),
                    "mhk2-00.dat",
                ),
                game("mhk_3", "Moorhuhn Kart 3", "mhk_3.sar", None, "data.sar"),
                game("mhk_4", "Moorhuhn Kart: Thunder", "mhk_4.sar", None, "data.sar"),
            ],
        }
    }
}

/// One game entry in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSpec {
    /// Identifier, optionally with a dotted variant suffix (`mhk_2.en`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Original data file, relative to `data_root` unless absolute
    pub datafile: PathBuf,

    /// Mods folder, relative to `mods_root` unless absolute (default: the game id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mods_folder: Option<PathBuf>,

    /// File name of the packed artifact (default: the data file's name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("mhk_2.en"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.cache.max_age_secs, 3600);
        assert_eq!(config.catalog.games.len(), 5);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            max_entries = 3

            [[catalog.games]]
            id = "demo"
            name = "Demo"
            datafile = "demo.dat"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.max_entries, 3);
        assert_eq!(config.cache.max_age_secs, 3600); // default preserved
        assert_eq!(config.catalog.games.len(), 1);
        assert!(config.catalog.games[0].mods_folder.is_none());
    }

    #[test]
    fn validate_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.cache.max_entries = 0;
        assert!(config.validate().unwrap_err().contains("max_entries"));
    }

    #[test]
    fn validate_rejects_duplicate_games() {
        let mut config = Config::default();
        let first = config.catalog.games[0].clone();
        config.catalog.games.push(first);
        assert!(config.validate().unwrap_err().contains("duplicate"));
    }
}
