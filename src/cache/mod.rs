//! Artifact cache
//!
//! Packed data files are cached by the identity of the request that produced
//! them: the game id plus the normalized set of selected mod ids.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   <key>.XXXXXX/     one directory per pack attempt; registered on success
//!     <out_filename>  the packed data file
//! ```
//!
//! The index is rebuilt empty at every start; nothing under `<root>` outlives
//! the process that wrote it.

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{ArtifactStore, CacheEntry, Registered};
