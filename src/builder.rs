//! Builder pattern for constructing a logger.
//!
//! # Example
//!
//! ```rust,no_run
//! use filelog::{Context, Level};
//!
//! let mut logger = filelog::builder("/var/log/myapp", "billing")
//!     .with_level(Level::Info)
//!     .with_max_file_size_mb(10)
//!     .build()
//!     .expect("Failed to create logger");
//!
//! logger.info("charged {user}", &Context::new().with("user", "alice"))?;
//! # Ok::<(), filelog::Error>(())
//! ```

use std::path::PathBuf;

use crate::{Filesystem, Level, LocalFilesystem, Logger, LoggerConfig, Result};

/// A builder for configuring and constructing a [`Logger`].
#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    level_name: Option<String>,
}

impl LoggerBuilder {
    /// Create a builder with default level and size limit.
    pub fn new(root_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::from_config(LoggerConfig::new(root_path, name))
    }

    /// Create a builder from an existing configuration.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            level_name: None,
        }
    }

    /// Set the minimum level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.config = self.config.with_level(level);
        self.level_name = None;
        self
    }

    /// Set the minimum level by name (e.g. "debug", "warning").
    ///
    /// The name is checked when the logger is built.
    pub fn with_level_name(mut self, level: impl Into<String>) -> Self {
        self.level_name = Some(level.into());
        self
    }

    /// Set the size, in megabytes, at which the active file is archived.
    pub fn with_max_file_size_mb(mut self, megabytes: u64) -> Self {
        self.config = self.config.with_max_file_size_mb(megabytes);
        self
    }

    /// Set the size, in bytes, at which the active file is archived.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.config = self.config.with_max_file_size(bytes);
        self
    }

    /// Resolve the configuration without constructing a logger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevel`](crate::Error::InvalidLevel) if a level
    /// name was given and is not recognised.
    pub fn config(self) -> Result<LoggerConfig> {
        let mut config = self.config;
        if let Some(name) = self.level_name {
            config.level = name.parse()?;
        }
        Ok(config)
    }

    /// Build a logger writing to the real filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A level name was given and is not recognised
    /// - The root path is not an existing, writable directory
    /// - The configuration is invalid
    pub fn build(self) -> Result<Logger<LocalFilesystem>> {
        self.build_with(LocalFilesystem::new())
    }

    /// Build a logger on top of the given filesystem.
    pub fn build_with<F: Filesystem>(self, fs: F) -> Result<Logger<F>> {
        Logger::with_filesystem(self.config()?, fs)
    }
}
