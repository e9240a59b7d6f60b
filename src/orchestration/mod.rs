//! Pack orchestration
//!
//! Drives the external packer for cache misses:
//! - `Packer`: seam over "run one pack", implemented by `ProcessPacker`
//! - `PackOrchestrator`: validates the selection and the packer's outcome

mod packer;
mod process;

pub use packer::{PackOrchestrator, PackRequest, PackResult, Packer, PACK_SUBCOMMAND};
pub use process::ProcessPacker;

#[cfg(test)]
pub(crate) use packer::testing;

use crate::config::PackerConfig;
use std::sync::Arc;
use std::time::Duration;

/// Create the packer described by the `[packer]` config section
pub fn create_packer(config: &PackerConfig) -> Arc<dyn Packer> {
    let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));

    Arc::new(
        ProcessPacker::new(&config.binary)
            .with_leading_args(&config.leading_args)
            .with_timeout(timeout),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_packer_uses_binary_name() {
        let config = PackerConfig {
            binary: "/opt/idlemod/idlemod".into(),
            leading_args: vec![],
            timeout_secs: 0,
        };
        assert_eq!(create_packer(&config).packer_name(), "/opt/idlemod/idlemod");
    }
}
