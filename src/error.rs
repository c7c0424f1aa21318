use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Errors that can occur while configuring or writing to a log
#[derive(ThisError, Debug)]
pub enum Error {
    /// Root path is missing, not a directory, or not writable.
    #[error("Invalid log path: {}", .0.display())]
    InvalidPath(PathBuf),
    /// Level name is not one of the eight supported severities.
    #[error("Invalid log level: {0:?}")]
    InvalidLevel(String),
    /// The per-name log directory could not be created.
    #[error("Can't create log directory {}: {source}", .path.display())]
    DirectoryCreate {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Open, write, rename or stat failed.
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Timestamp could not be formatted.
    #[error("Time format error: {0}")]
    Time(#[from] time::error::Format),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
