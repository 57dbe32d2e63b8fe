use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    /// An optional file is absent. Expected, never logged.
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A file exists but its structured content could not be decoded.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Permission, timeout or other transient file-system failure.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watcher error: {0}")]
    Watch(String),
}

impl ScoutError {
    /// Classify an I/O failure on `path`: a missing file is `NotFound`, anything else is `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Result type alias for Scout operations
pub type ScoutResult<T> = Result<T, ScoutError>;
