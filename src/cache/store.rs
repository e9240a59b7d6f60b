//! Bounded artifact store
//!
//! Maps cache keys to artifacts under a dedicated root directory. The index
//! lives in memory only; whatever is on disk when the store opens belongs to
//! a previous process and is deleted.
//!
//! Entries leave the index when they expire (not accessed for `max_age`),
//! when the store is full (least recently accessed goes first), or when their
//! backing path has disappeared from disk.

use crate::cache::key::CacheKey;
use crate::error::{PackcacheError, PackcacheResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;
use tracing::{debug, info, warn};

type Index = HashMap<CacheKey, CacheEntry>;

/// A cached artifact
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// Identity of the request that produced the artifact
    pub key: CacheKey,
    /// File or directory holding the artifact
    pub path: PathBuf,
    /// Last time the entry was stored or returned by `get`
    pub last_access: DateTime<Utc>,
}

/// Filesystem-backed cache of packed artifacts
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    max_entries: usize,
    max_age: Duration,
    entries: Mutex<Index>,
}

/// Outcome of `ArtifactStore::register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// Path now indexed for the key
    pub path: PathBuf,
    /// Keys evicted to make room
    pub evicted: Vec<CacheKey>,
}

impl ArtifactStore {
    /// Open the store at `root`, creating it if needed and removing stale content
    pub fn open(
        root: impl Into<PathBuf>,
        max_entries: usize,
        max_age_secs: u64,
    ) -> PackcacheResult<Self> {
        let root = root.into();
        if max_entries == 0 {
            return Err(PackcacheError::ConfigInvalid {
                path: root,
                reason: "cache capacity must be at least 1".to_string(),
            });
        }

        fs::create_dir_all(&root).map_err(|e| {
            PackcacheError::io(format!("creating cache directory {}", root.display()), e)
        })?;

        let store = Self {
            root,
            max_entries,
            max_age: i64::try_from(max_age_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            entries: Mutex::new(HashMap::new()),
        };
        store.cleanup_stale();

        info!(
            "Artifact store at {} (max {} entries, max age {}s)",
            store.root.display(),
            max_entries,
            max_age_secs
        );
        Ok(store)
    }

    /// Root directory owned by the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fresh directory under the root for one attempt at producing `key`
    ///
    /// The directory is removed when dropped; call `TempDir::keep` once the
    /// artifact is complete and about to be registered.
    pub fn staging_dir(&self, key: &CacheKey) -> PackcacheResult<TempDir> {
        tempfile::Builder::new()
            .prefix(&format!("{}.", key))
            .tempdir_in(&self.root)
            .map_err(|e| {
                PackcacheError::io(format!("creating staging directory for {}", key), e)
            })
    }

    /// Look up an artifact and refresh its access time
    ///
    /// An entry whose backing path is gone is dropped and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<PathBuf> {
        let mut entries = self.lock();

        let entry = entries.get_mut(key)?;
        if !entry.path.exists() {
            debug!("Cache entry {} lost its backing path, dropping", key);
            entries.remove(key);
            return None;
        }

        entry.last_access = Utc::now();
        Some(entry.path.clone())
    }

    /// Register an artifact, evicting expired and then least recently used entries
    ///
    /// Returns the keys that were evicted to make room.
    pub fn put(&self, key: CacheKey, path: impl Into<PathBuf>) -> Vec<CacheKey> {
        let mut entries = self.lock();
        self.insert(&mut entries, key, path.into())
    }

    /// Register a freshly produced artifact unless a live one is already indexed
    ///
    /// When another artifact for `key` is indexed and still on disk, it wins:
    /// its access time is refreshed, `path` is deleted and the existing path
    /// is returned. Otherwise behaves like `put`.
    pub fn register(&self, key: CacheKey, path: impl Into<PathBuf>) -> Registered {
        let path = path.into();
        let mut entries = self.lock();

        if let Some(existing) = entries.get_mut(&key) {
            if existing.path != path && existing.path.exists() {
                debug!("{} already cached at {}", key, existing.path.display());
                existing.last_access = Utc::now();
                let kept = existing.path.clone();
                remove_path(&path);
                return Registered {
                    path: kept,
                    evicted: vec![],
                };
            }
        }

        let evicted = self.insert(&mut entries, key, path.clone());
        Registered { path, evicted }
    }

    /// Drop `key` from the index and delete its artifact
    pub fn remove(&self, key: &CacheKey) -> bool {
        let mut entries = self.lock();
        let present = entries.contains_key(key);
        drop_entry(&mut entries, key);
        present
    }

    fn insert(&self, entries: &mut Index, key: CacheKey, path: PathBuf) -> Vec<CacheKey> {
        // A replaced entry must not be evicted below, that would delete the new artifact
        if let Some(previous) = entries.remove(&key) {
            if previous.path != path {
                remove_path(&previous.path);
            }
        }

        let now = Utc::now();
        let mut evicted = self.evict_expired(entries, now);
        evicted.extend(self.evict_oldest(entries));

        debug!("Caching {} at {}", key, path.display());
        entries.insert(
            key.clone(),
            CacheEntry {
                key,
                path,
                last_access: now,
            },
        );

        evicted
    }

    /// Whether the index currently holds `key` (no access-time refresh)
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Last access time of `key`, if indexed
    pub fn last_access(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|e| e.last_access)
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of all entries, most recently accessed first
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut snapshot: Vec<CacheEntry> = self.lock().values().cloned().collect();
        snapshot.sort_by(|a, b| b.last_access.cmp(&a.last_access));
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, Index> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove everything under the root left over from an earlier run
    fn cleanup_stale(&self) {
        let items = match fs::read_dir(&self.root) {
            Ok(items) => items,
            Err(e) => {
                warn!("Cannot list cache directory {}: {}", self.root.display(), e);
                return;
            }
        };

        let mut removed = 0;
        for item in items.flatten() {
            if remove_path(&item.path()) {
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Removed {} stale cache items", removed);
        }
    }

    fn evict_expired(
        &self,
        entries: &mut Index,
        now: DateTime<Utc>,
    ) -> Vec<CacheKey> {
        let expired: Vec<CacheKey> = entries
            .values()
            .filter(|e| now - e.last_access > self.max_age)
            .map(|e| e.key.clone())
            .collect();

        for key in &expired {
            debug!("Evicting expired cache entry {}", key);
            drop_entry(entries, key);
        }
        expired
    }

    fn evict_oldest(&self, entries: &mut Index) -> Vec<CacheKey> {
        let mut evicted = Vec::new();

        while !entries.is_empty() && entries.len() >= self.max_entries {
            let Some(oldest) = entries
                .values()
                .min_by_key(|e| e.last_access)
                .map(|e| e.key.clone())
            else {
                break;
            };

            debug!("Evicting least recently used cache entry {}", oldest);
            drop_entry(entries, &oldest);
            evicted.push(oldest);
        }

        evicted
    }
}

/// Drop an entry from the index and delete its artifact (best effort)
fn drop_entry(entries: &mut Index, key: &CacheKey) {
    if let Some(entry) = entries.remove(key) {
        remove_path(&entry.path);
    }
}

/// Delete a file or directory tree, logging failures instead of returning them
pub(crate) fn remove_path(path: &Path) -> bool {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            false
        }
    }
}
