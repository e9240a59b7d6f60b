//! Catalog of known games and their mods
//!
//! Loaded once from the `[catalog]` config section and read-only afterwards.

mod game;

pub use game::{Game, Mod};

use crate::config::CatalogConfig;
use crate::error::{PackcacheError, PackcacheResult};
use tracing::info;

/// Immutable set of games, in configuration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<Game>,
}

impl Catalog {
    /// Load every configured game and scan its mods folder
    pub fn load(config: &CatalogConfig) -> PackcacheResult<Self> {
        let games = config
            .games
            .iter()
            .map(|spec| Game::load(spec, &config.data_root, &config.mods_root))
            .collect::<PackcacheResult<Vec<_>>>()?;

        info!("Catalog loaded: {} games", games.len());
        Ok(Self { games })
    }

    /// Build a catalog from already-loaded games
    pub fn from_games(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Find a game by its full id
    pub fn resolve(&self, game_id: &str) -> PackcacheResult<&Game> {
        self.games
            .iter()
            .find(|g| g.id == game_id)
            .ok_or_else(|| PackcacheError::GameNotFound(game_id.to_string()))
    }

    /// All games, in configuration order
    pub fn games(&self) -> &[Game] {
        &self.games
    }
}
