//! # Filelog
//!
//! A leveled file logger with per-name log directories and size-based rotation.
//!
//! ## Features
//!
//! - Eight ordered severities, filtered against a minimum level
//! - One log per name at `<root>/<name>/<name>.log`, directory created on first write
//! - Size-based rotation to `<name>_<YYYY-MM-DD_HH:MM:SS>.log`
//! - `{placeholder}` interpolation from a typed context
//! - Pluggable storage through the [`Filesystem`] trait, with an in-memory implementation
//! - A `tracing` layer that forwards events into a logger
//!
//! Each line is `<timestamp>\t<LEVEL>\t<message>\n`, with the timestamp in
//! local time as `YYYY-MM-DDThh:mm:ss.mmm`.
//!
//! ## Example
//!
//! ```rust
//! use filelog::{Context, Level, Logger, LoggerConfig};
//!
//! let root = tempfile::tempdir()?;
//! let config = LoggerConfig::new(root.path(), "app").with_level(Level::Info);
//! let mut logger = Logger::new(config)?;
//!
//! logger.debug("dropped", &Context::new())?;
//! logger.warning("disk at {pct}%", &Context::new().with("pct", 91))?;
//!
//! let text = std::fs::read_to_string(root.path().join("app/app.log"))?;
//! assert!(text.ends_with("\tWARNING\tdisk at 91%\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::PathBuf;

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod filesystem;
pub mod format;
pub mod layer;
pub mod level;
pub mod logger;
pub mod memory;
pub mod rotation;

pub use builder::LoggerBuilder;
pub use config::LoggerConfig;
pub use context::{Context, Value};
pub use error::{Error, Result};
pub use filesystem::{Filesystem, LocalFilesystem};
pub use format::interpolate;
pub use layer::FileLayer;
pub use level::Level;
pub use logger::Logger;
pub use memory::MemoryFilesystem;
pub use rotation::Rotation;

/// Start building a logger for `name` under `root_path`.
pub fn builder(
    root_path: impl Into<PathBuf>,
    name: impl Into<String>,
) -> LoggerBuilder {
    LoggerBuilder::new(root_path, name)
}
