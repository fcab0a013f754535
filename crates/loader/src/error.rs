//! Error type for resource loading and live reload.

use std::path::PathBuf;

/// Errors that can occur while discovering, parsing or watching resource files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Path template is missing or repeats a placeholder.
    #[error("invalid path template '{template}': {reason}")]
    Template { template: String, reason: String },

    /// Resource file could not be parsed.
    #[error("localization file syntax error: {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    /// No parser exists for the file's extension.
    #[error("unknown localization file format: {}", .0.display())]
    UnknownFormat(PathBuf),

    /// Filesystem I/O error while walking or reading.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem watcher could not be set up.
    #[error("notify watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Blocking discovery task panicked or was cancelled.
    #[error("discovery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
