//! External packer process
//!
//! Runs the packer binary with an explicit argument vector (no shell), so
//! paths and ids are passed through untouched whatever characters they hold.

use crate::error::{PackcacheError, PackcacheResult};
use crate::orchestration::packer::{PackRequest, PackResult, Packer};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Packer backed by a child process
#[derive(Debug, Clone)]
pub struct ProcessPacker {
    binary: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ProcessPacker {
    /// Create a packer running `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: vec![],
            timeout: None,
        }
    }

    /// Arguments passed before the `packmod` subcommand
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the packer if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, request: &PackRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.leading_args)
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Packer for ProcessPacker {
    async fn pack(&self, request: &PackRequest<'_>) -> PackcacheResult<PackResult> {
        debug!(
            "Executing: {} {:?} {:?}",
            self.binary.display(),
            self.leading_args,
            request.args()
        );

        let child = self
            .command(request)
            .spawn()
            .map_err(|e| PackcacheError::PackerSpawn {
                binary: self.binary.display().to_string(),
                source: e,
            })?;

        // Dropping the wait future drops the child, and kill_on_drop terminates it
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!("Packer exceeded {}s, killed", limit.as_secs());
                    return Err(PackcacheError::PackerTimeout {
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| PackcacheError::io("waiting for packer", e))?;

        Ok(PackResult {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }

    fn packer_name(&self) -> String {
        self.binary.display().to_string()
    }
}
