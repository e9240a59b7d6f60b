//! packcache - mod packing with a bounded result cache
//!
//! Packs user-selected mods into a game's data file by running an external
//! packer, and keeps the results around so identical requests are served
//! without packing again.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestration;
pub mod service;
pub mod ui;

pub use error::{PackcacheError, PackcacheResult};
