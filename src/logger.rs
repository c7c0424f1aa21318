//! The file logger.

use std::path::{Path, PathBuf};

use crate::format::{format_line, now};
use crate::{Context, Error, Filesystem, Level, LocalFilesystem, LoggerConfig, Result, Rotation};

/// Writes leveled messages to `<root>/<name>/<name>.log`, archiving the file
/// once it reaches the configured size.
///
/// Every call is synchronous and either completes its write or returns the
/// error that stopped it. A logger assumes it is the only writer of its file:
/// two loggers (or processes) pointed at the same name may interleave lines
/// and race on rotation, so callers needing that must serialize access
/// themselves.
#[derive(Debug)]
pub struct Logger<F: Filesystem = LocalFilesystem> {
    config: LoggerConfig,
    rotation: Rotation,
    fs: F,
}

impl Logger<LocalFilesystem> {
    /// Create a logger writing to the real filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `config.root_path` is not an
    /// existing, writable directory, or [`Error::Config`] if the
    /// configuration is invalid.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_filesystem(config, LocalFilesystem::new())
    }
}

impl<F: Filesystem> Logger<F> {
    /// Create a logger on top of the given filesystem.
    pub fn with_filesystem(config: LoggerConfig, fs: F) -> Result<Self> {
        config.validate()?;
        if !fs.check_path(&config.root_path) {
            return Err(Error::InvalidPath(config.root_path.clone()));
        }

        let rotation = Rotation::new(config.log_dir(), config.name.clone(), config.max_file_size);
        Ok(Self {
            config,
            rotation,
            fs,
        })
    }

    /// Configuration the logger was built with.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Minimum level that is written.
    pub fn level(&self) -> Level {
        self.config.level
    }

    /// Path of the active log file.
    pub fn active_path(&self) -> PathBuf {
        self.rotation.active_path()
    }

    /// Directory holding the active file and its archives.
    pub fn log_dir(&self) -> &Path {
        self.rotation.dir()
    }

    /// Underlying filesystem.
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Underlying filesystem, mutably.
    pub fn filesystem_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Write `message` at `level`, substituting `{key}` placeholders from `context`.
    ///
    /// Messages below the configured level are dropped without touching storage.
    pub fn log(&mut self, level: Level, message: &str, context: &Context) -> Result<()> {
        if !level.should_emit(self.config.level) {
            return Ok(());
        }

        let dir = self.rotation.dir();
        if !self.fs.is_dir(dir) {
            self.fs.mkdir(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
            tracing::debug!(path = %dir.display(), "created log directory");
        }

        let at = now();
        self.rotation.rotate_if_needed(&mut self.fs, at)?;

        let line = format_line(at, level, message, context)?;
        self.fs.write(&self.rotation.active_path(), line.as_bytes())?;
        Ok(())
    }

    /// Like [`Logger::log`], with the level given by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevel`] before any I/O if `level` is not one
    /// of the eight level names.
    pub fn log_named(&mut self, level: &str, message: &str, context: &Context) -> Result<()> {
        let level = level.parse()?;
        self.log(level, message, context)
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Debug, message, context)
    }

    /// Log at [`Level::Info`].
    pub fn info(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Info, message, context)
    }

    /// Log at [`Level::Notice`].
    pub fn notice(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Notice, message, context)
    }

    /// Log at [`Level::Warning`].
    pub fn warning(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Warning, message, context)
    }

    /// Log at [`Level::Error`].
    pub fn error(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Error, message, context)
    }

    /// Log at [`Level::Critical`].
    pub fn critical(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Critical, message, context)
    }

    /// Log at [`Level::Alert`].
    pub fn alert(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Alert, message, context)
    }

    /// Log at [`Level::Emergency`].
    pub fn emergency(&mut self, message: &str, context: &Context) -> Result<()> {
        self.log(Level::Emergency, message, context)
    }

    /// Release the open file handle. The next write reopens it.
    pub fn close(&mut self) -> Result<()> {
        self.fs.close()?;
        Ok(())
    }

    /// Consume the logger, returning its filesystem with the handle released.
    pub fn into_filesystem(mut self) -> Result<F> {
        self.fs.close()?;
        Ok(self.fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryFilesystem, Value};

    fn memory_logger(config: LoggerConfig) -> Logger<MemoryFilesystem> {
        let fs = MemoryFilesystem::new().with_dir("/root");
        Logger::with_filesystem(config, fs).unwrap()
    }

    fn lines(logger: &Logger<MemoryFilesystem>) -> Vec<String> {
        logger
            .filesystem()
            .read_to_string(&logger.active_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_construction_checks_root() {
        let fs = MemoryFilesystem::new();
        let err = Logger::with_filesystem(LoggerConfig::new("/missing", "test"), fs).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(ref p) if p == Path::new("/missing")));

        let fs = MemoryFilesystem::new().with_readonly_dir("/ro");
        let err = Logger::with_filesystem(LoggerConfig::new("/ro", "test"), fs).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn test_construction_validates_config() {
        let fs = MemoryFilesystem::new().with_dir("/root");
        let config = LoggerConfig::new("/root", "test").with_max_file_size(0);
        assert!(matches!(
            Logger::with_filesystem(config, fs),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_construction_has_no_side_effects() {
        let logger = memory_logger(LoggerConfig::new("/root", "test"));
        assert!(!logger.filesystem().exists(Path::new("/root/test")));
        assert_eq!(logger.filesystem().opens(), 0);
    }

    #[test]
    fn test_log_creates_directory_and_file() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
        logger.debug("qwe", &Context::new()).unwrap();

        assert!(logger.filesystem().is_dir(Path::new("/root/test")));
        assert_eq!(logger.active_path(), PathBuf::from("/root/test/test.log"));
        let lines = lines(&logger);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("\tDEBUG\tqwe"));
    }

    #[test]
    fn test_each_level_is_written() {
        for level in Level::ALL {
            let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
            logger.log(level, "qwe", &Context::new()).unwrap();
            let lines = lines(&logger);
            assert_eq!(lines.len(), 1);
            assert!(lines[0].contains(&format!("\t{}\t", level.as_upper())));
        }
    }

    #[test]
    fn test_filtered_levels_touch_nothing() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test").with_level(Level::Warning));
        logger.debug("qwe", &Context::new()).unwrap();
        logger.info("qwe", &Context::new()).unwrap();
        logger.notice("qwe", &Context::new()).unwrap();

        assert!(!logger.filesystem().exists(Path::new("/root/test")));
        assert_eq!(logger.filesystem().opens(), 0);

        logger.warning("qwe", &Context::new()).unwrap();
        logger.error("qwe", &Context::new()).unwrap();
        logger.critical("qwe", &Context::new()).unwrap();
        logger.alert("qwe", &Context::new()).unwrap();
        logger.emergency("qwe", &Context::new()).unwrap();
        assert_eq!(lines(&logger).len(), 5);
    }

    #[test]
    fn test_log_named() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
        logger.log_named("notice", "qwe", &Context::new()).unwrap();
        assert!(lines(&logger)[0].contains("\tNOTICE\t"));

        let err = logger.log_named("wrong", "qwe", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(ref name) if name == "wrong"));
        assert_eq!(lines(&logger).len(), 1);
    }

    #[test]
    fn test_log_interpolates_context() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
        let ctx = Context::new()
            .with("user", "alice")
            .with("ok", true)
            .with("tags", Value::List(vec![]));
        logger.info("{user} ok={ok} {tags}", &ctx).unwrap();
        assert!(lines(&logger)[0].ends_with("\talice ok=true {tags}"));
    }

    #[test]
    fn test_handle_is_reused() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
        for _ in 0..3 {
            logger.debug("qwe", &Context::new()).unwrap();
        }
        assert_eq!(logger.filesystem().opens(), 1);
        assert_eq!(lines(&logger).len(), 3);
    }

    #[test]
    fn test_rotation_before_write() {
        let mut logger =
            memory_logger(LoggerConfig::new("/root", "test").with_max_file_size(16));
        logger.debug("first", &Context::new()).unwrap();
        logger.debug("second", &Context::new()).unwrap();

        let files = logger.filesystem().files_in(Path::new("/root/test"));
        assert_eq!(files.len(), 2);
        assert_eq!(lines(&logger).len(), 1);
        assert!(lines(&logger)[0].ends_with("\tsecond"));
        assert_eq!(logger.filesystem().opens(), 2);
        assert_eq!(logger.filesystem().closes(), 1);

        let archive = files
            .iter()
            .find(|p| **p != logger.active_path())
            .unwrap();
        let archived = logger.filesystem().read_to_string(archive).unwrap();
        assert!(archived.ends_with("\tfirst\n"));
    }

    #[test]
    fn test_directory_create_error() {
        let fs = MemoryFilesystem::new().with_dir("/root").failing_mkdir();
        let mut logger = Logger::with_filesystem(LoggerConfig::new("/root", "test"), fs).unwrap();
        let err = logger.debug("qwe", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { ref path, .. } if path == Path::new("/root/test")));
    }

    #[test]
    fn test_write_error_propagates() {
        let fs = MemoryFilesystem::new().with_dir("/root").failing_write();
        let mut logger = Logger::with_filesystem(LoggerConfig::new("/root", "test"), fs).unwrap();
        let err = logger.debug("qwe", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::Filesystem(_)));
    }

    #[test]
    fn test_rename_error_propagates() {
        let fs = MemoryFilesystem::new().with_dir("/root/test").failing_mv();
        let mut logger = Logger::with_filesystem(
            LoggerConfig::new("/root", "test").with_max_file_size(1),
            fs,
        )
        .unwrap();
        logger
            .filesystem_mut()
            .set_contents("/root/test/test.log", b"x".to_vec());

        let err = logger.debug("qwe", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::Filesystem(_)));
        assert_eq!(
            logger
                .filesystem()
                .read_to_string(Path::new("/root/test/test.log"))
                .as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_close_and_into_filesystem() {
        let mut logger = memory_logger(LoggerConfig::new("/root", "test"));
        logger.debug("qwe", &Context::new()).unwrap();
        logger.close().unwrap();
        assert!(logger.filesystem().open_path().is_none());

        logger.debug("qwe", &Context::new()).unwrap();
        let fs = logger.into_filesystem().unwrap();
        assert!(fs.open_path().is_none());
        assert_eq!(fs.opens(), 2);
        assert_eq!(fs.closes(), 2);
    }
}
