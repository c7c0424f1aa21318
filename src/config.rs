use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rotation::{BYTES_IN_MB, deserialize_size, serialize_size};
use crate::{Error, Level, Result};

/// Configuration for a file logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Existing, writable directory that holds the per-name log directory
    pub root_path: PathBuf,
    /// Name of the log; used for both the subdirectory and the file stem
    pub name: String,
    /// Minimum level that is written
    #[serde(default)]
    pub level: Level,
    /// Size in bytes at which the active file is archived.
    /// Accepts a number of megabytes or a string with units (B/K/M/G, case-insensitive).
    #[serde(
        default = "default_max_file_size",
        serialize_with = "serialize_size",
        deserialize_with = "deserialize_size"
    )]
    pub max_file_size: u64,
}

impl LoggerConfig {
    /// Create a new LoggerConfig with defaults
    pub fn new(root_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            name: name.into(),
            level: Level::default(),
            max_file_size: default_max_file_size(),
        }
    }

    /// Set the minimum level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the maximum file size in megabytes
    pub fn with_max_file_size_mb(mut self, megabytes: u64) -> Self {
        self.max_file_size = megabytes.saturating_mul(BYTES_IN_MB);
        self
    }

    /// Set the maximum file size in bytes
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Directory holding the active file and its archives
    pub fn log_dir(&self) -> PathBuf {
        self.root_path.join(&self.name)
    }

    /// Check values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("log name must not be empty".to_string()));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(Error::Config(format!(
                "log name must be a single path component: {}",
                self.name
            )));
        }
        if self.max_file_size == 0 {
            return Err(Error::Config(
                "max file size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_file_size() -> u64 {
    100 * BYTES_IN_MB
}
