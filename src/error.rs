//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-probe network
//! failures are deliberately absent: a failed connect is a closed port,
//! not an error.

use crate::types::PortError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid port range: {0}")]
    InvalidRange(#[from] PortError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Error creating file {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job queue closed with {remaining} ports still undispatched")]
    QueueClosed { remaining: usize },

    #[error("Scan worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Whether this error stems from user-supplied configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange(_) | Self::InvalidConfig(_) | Self::OutputFile { .. }
        )
    }
}

/// Errors raised while loading the service catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("malformed service catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service catalog key '{0}' is not a port number")]
    InvalidPort(String),
}

/// Errors raised while loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
