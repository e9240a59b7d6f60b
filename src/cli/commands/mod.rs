//! CLI command implementations

pub mod config;
pub mod games;
pub mod mods;
pub mod pack;
pub mod serve;

pub use config::execute as config;
pub use games::execute as games;
pub use mods::execute as mods;
pub use pack::execute as pack;
pub use serve::execute as serve;
