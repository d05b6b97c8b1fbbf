//! # Host Error Types

use std::path::PathBuf;

use granule_core::SimError;
use thiserror::Error;

/// Errors from loading configuration or building a simulation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::SimulationConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered back to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The engine rejected the grid or material list.
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Result type for host operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
