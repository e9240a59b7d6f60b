//! Error types for packcache
//!
//! All modules use `PackcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for packcache operations
pub type PackcacheResult<T> = Result<T, PackcacheError>;

/// All errors that can occur in packcache
#[derive(Error, Debug)]
pub enum PackcacheError {
    // Request errors
    #[error("Game with ID `{0}` not found")]
    GameNotFound(String),

    #[error("No valid mods selected to pack for {game}")]
    NoValidModsSelected { game: String },

    // Packer errors
    #[error("Failed to pack mods: {stderr}")]
    PackerInvocationFailed { code: Option<i32>, stderr: String },

    #[error("Pack command succeeded but output file was not created: {}", .0.display())]
    PackerOutputMissing(PathBuf),

    #[error("Packer did not finish within {secs}s and was killed")]
    PackerTimeout { secs: u64 },

    #[error("Failed to start packer {binary}: {source}")]
    PackerSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid mod config {path}: {reason}")]
    ModConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PackcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a packer failure from captured stderr bytes
    pub fn packer_failed(code: Option<i32>, stderr: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stderr).trim().to_string();
        Self::PackerInvocationFailed {
            code,
            stderr: if text.is_empty() {
                "Unknown error".to_string()
            } else {
                text
            },
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PackerTimeout { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::GameNotFound(_) => Some("Run: packcache games"),
            Self::NoValidModsSelected { .. } => Some("Run: packcache mods <game>"),
            Self::PackerSpawn { .. } => Some("Set [packer] binary in the config file"),
            Self::PackerOutputMissing(_) => Some("The packer exited cleanly; check its version"),
            Self::PackerTimeout { .. } => Some("Raise [packer] timeout_secs or try again"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PackcacheError::GameNotFound("mhk_9".to_string());
        assert!(err.to_string().contains("`mhk_9` not found"));
    }

    #[test]
    fn error_hint() {
        let err = PackcacheError::GameNotFound("x".to_string());
        assert_eq!(err.hint(), Some("Run: packcache games"));
        let io = PackcacheError::io("x", std::io::Error::other("boom"));
        assert!(io.hint().is_none());
    }

    #[test]
    fn error_retryable() {
        assert!(PackcacheError::PackerTimeout { secs: 5 }.is_retryable());
        assert!(!PackcacheError::packer_failed(Some(1), b"bad mod").is_retryable());
    }

    #[test]
    fn packer_failed_carries_stderr() {
        let err = PackcacheError::packer_failed(Some(1), b"bad mod\n");
        assert_eq!(err.to_string(), "Failed to pack mods: bad mod");
    }

    #[test]
    fn packer_failed_empty_stderr() {
        let err = PackcacheError::packer_failed(Some(2), b"");
        assert_eq!(err.to_string(), "Failed to pack mods: Unknown error");
    }
}
