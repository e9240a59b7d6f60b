//! Request handling: resolve a game, then serve a cached artifact or pack one
//!
//! ```text
//! request -> CacheKey::derive -> ArtifactStore::get
//!              hit  -> existing path
//!              miss -> PackOrchestrator::run -> ArtifactStore::put -> new path
//! ```
//!
//! The store lock is only held for index bookkeeping, never while the packer
//! runs, so a slow pack does not hold up lookups for other keys.
//!
//! Every miss packs into its own staging directory. A failed attempt only
//! ever deletes its own directory, and when two attempts for one key both
//! succeed the first one registered is served to both.

use crate::cache::{ArtifactStore, CacheKey};
use crate::catalog::{Catalog, Game};
use crate::config::Config;
use crate::error::{PackcacheError, PackcacheResult};
use crate::orchestration::{create_packer, PackOrchestrator};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A packed data file ready to be served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Identity of the request
    pub key: CacheKey,
    /// The packed file
    pub path: PathBuf,
    /// Whether the file came from the cache
    pub cached: bool,
}

/// Entry point for pack requests, shared across concurrent requests
pub struct PackService {
    catalog: Catalog,
    store: Arc<ArtifactStore>,
    orchestrator: PackOrchestrator,
}

impl PackService {
    /// Assemble a service from its parts
    pub fn new(catalog: Catalog, store: Arc<ArtifactStore>, orchestrator: PackOrchestrator) -> Self {
        Self {
            catalog,
            store,
            orchestrator,
        }
    }

    /// Build everything from configuration: catalog, store (wiping stale files) and packer
    pub fn from_config(config: &Config) -> PackcacheResult<Self> {
        let catalog = Catalog::load(&config.catalog)?;
        let store = ArtifactStore::open(
            &config.cache.root_dir,
            config.cache.max_entries,
            config.cache.max_age_secs,
        )?;
        let orchestrator = PackOrchestrator::new(create_packer(&config.packer));

        Ok(Self::new(catalog, Arc::new(store), orchestrator))
    }

    /// Find a game by id
    pub fn resolve(&self, game_id: &str) -> PackcacheResult<&Game> {
        self.catalog.resolve(game_id)
    }

    /// The loaded catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The artifact store
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Return the artifact for `game` with `mod_ids`, packing it on a cache miss
    ///
    /// Unknown mod ids are ignored; if none of the ids are known the request
    /// fails with `NoValidModsSelected` and the packer is not run.
    pub async fn lookup_or_pack<S: AsRef<str>>(
        &self,
        game: &Game,
        mod_ids: &[S],
    ) -> PackcacheResult<Artifact> {
        let selected = game.select_mods(mod_ids);
        if selected.is_empty() {
            return Err(PackcacheError::NoValidModsSelected {
                game: game.id.clone(),
            });
        }

        let selected_ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        let key = CacheKey::derive(&game.id, &selected_ids);

        if let Some(dir) = self.store.get(&key) {
            let path = dir.join(&game.out_filename);
            if path.is_file() {
                debug!("Cache hit for {} ({})", game.id, key);
                return Ok(Artifact {
                    path,
                    key,
                    cached: true,
                });
            }
            debug!("Cached {} lost {}, repacking", key, game.out_filename);
            self.store.remove(&key);
        }

        let staging = self.store.staging_dir(&key)?;
        let output = staging.path().join(&game.out_filename);
        debug!("Cache miss for {} ({}), packing", game.id, key);

        // On error `staging` drops here and takes any partial output with it
        if let Err(e) = self.orchestrator.run(game, &output, &selected).await {
            if e.is_retryable() {
                warn!("Packing {} failed, a retry may succeed: {}", game.id, e);
            } else {
                warn!("Packing {} failed: {}", game.id, e);
            }
            return Err(e);
        }

        let registered = self.store.register(key.clone(), staging.keep());
        if !registered.evicted.is_empty() {
            info!("Evicted {} cached artifact(s)", registered.evicted.len());
        }

        Ok(Artifact {
            key,
            path: registered.path.join(&game.out_filename),
            cached: false,
        })
    }

    /// Resolve `game_id` and look up or pack in one call
    pub async fn request<S: AsRef<str>>(
        &self,
        game_id: &str,
        mod_ids: &[S],
    ) -> PackcacheResult<Artifact> {
        let game = self.resolve(game_id)?;
        self.lookup_or_pack(game, mod_ids).await
    }
}
