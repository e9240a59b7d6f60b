//! Cache key derivation
//!
//! A key identifies a (game, mod set) request. Mod ids are deduplicated and
//! sorted before hashing, so request order never causes a miss.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Number of digest bytes kept in a key (rendered as twice as many hex chars)
const KEY_BYTES: usize = 16;

/// Field terminator; cannot appear in a file name and so not in any id
const TERMINATOR: u8 = 0;

/// Fixed-width hex identity of a (game, mod set) request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a game and a set of mod ids
    pub fn derive<S: AsRef<str>>(game_id: &str, mod_ids: &[S]) -> Self {
        let mods: BTreeSet<&str> = mod_ids.iter().map(AsRef::as_ref).collect();

        let mut hasher = Sha256::new();
        hasher.update(game_id.as_bytes());
        hasher.update([TERMINATOR]);
        for id in mods {
            hasher.update(id.as_bytes());
            hasher.update([TERMINATOR]);
        }
        let digest = hasher.finalize();

        Self(hex::encode(&digest[..KEY_BYTES]))
    }

    /// The key as a string, also used as its directory name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_fixed_width_hex() {
        let key = CacheKey::derive("mhk_1", &["a", "b"]);
        assert_eq!(key.as_str().len(), KEY_BYTES * 2);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));

        let empty = CacheKey::derive("mhk_1", &[] as &[&str]);
        assert_eq!(empty.as_str().len(), KEY_BYTES * 2);
    }

    #[test]
    fn order_and_duplicates_ignored() {
        let a = CacheKey::derive("g1", &["a", "b", "c"]);
        let b = CacheKey::derive("g1", &["c", "a", "b"]);
        let c = CacheKey::derive("g1", &["b", "a", "c", "a", "b"]);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn game_changes_key() {
        assert_ne!(
            CacheKey::derive("mhk_2.en", &["a"]),
            CacheKey::derive("mhk_2.de", &["a"])
        );
    }

    #[test]
    fn mod_set_changes_key() {
        let base = CacheKey::derive("g1", &["a", "b"]);
        assert_ne!(base, CacheKey::derive("g1", &["a"]));
        assert_ne!(base, CacheKey::derive("g1", &["a", "b", "c"]));
        assert_ne!(base, CacheKey::derive("g1", &["a", "c"]));
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        // Same concatenated bytes, different split between game and mods
        assert_ne!(
            CacheKey::derive("g1a", &["b"]),
            CacheKey::derive("g1", &["ab"])
        );
        assert_ne!(
            CacheKey::derive("g1", &["ab"]),
            CacheKey::derive("g1", &["a", "b"])
        );
    }

    #[test]
    fn display_matches_as_str() {
        let key = CacheKey::derive("g1", &["x"]);
        assert_eq!(key.to_string(), key.as_str());
    }
}
