//! Storage primitives the logger is written against.
//!
//! [`Logger`](crate::Logger) never touches storage directly: directory checks,
//! size probes, renames and appends all go through a [`Filesystem`]. The
//! default [`LocalFilesystem`] talks to the real filesystem, and
//! [`MemoryFilesystem`](crate::MemoryFilesystem) models it in memory for tests.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Directory and file primitives needed to write and rotate logs.
///
/// Implementations own at most one open append handle. [`Filesystem::write`]
/// opens it lazily and [`Filesystem::close`] releases it.
pub trait Filesystem {
    /// Whether `path` is an existing, writable directory.
    fn check_path(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn mkdir(&mut self, path: &Path) -> io::Result<()>;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Size of the file at `path` in bytes.
    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Append `bytes` to `path`, creating the file if needed.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Rename `from` to `to`, replacing `to` if it exists.
    fn mv(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    /// Release the open handle, if any.
    fn close(&mut self) -> io::Result<()>;
}

/// Open append handle and the path it was opened for.
#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    file: File,
}

impl OpenFile {
    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::trace!(path = %path.display(), "opened log file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

/// [`Filesystem`] backed by the real filesystem.
#[derive(Debug, Default)]
pub struct LocalFilesystem {
    handle: Option<OpenFile>,
}

impl LocalFilesystem {
    /// Create an adapter with no open handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the currently open handle.
    pub fn open_path(&self) -> Option<&Path> {
        self.handle.as_ref().map(|h| h.path.as_path())
    }
}

/// Whether this process may create entries in the directory at `path`.
#[cfg(unix)]
fn is_writable(path: &Path, _meta: &std::fs::Metadata) -> bool {
    use nix::unistd::{AccessFlags, access};

    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(_path: &Path, meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

impl Filesystem for LocalFilesystem {
    fn check_path(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.is_dir() && is_writable(path, &meta),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn mkdir(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        // A handle bound to another path is stale.
        if self.handle.as_ref().is_some_and(|h| h.path != path) {
            self.close()?;
        }

        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => OpenFile::open(path)?,
        };
        let handle = self.handle.insert(handle);
        handle.file.write_all(bytes)
    }

    fn mv(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut handle) = self.handle.take() {
            handle.file.flush()?;
            tracing::trace!(path = %handle.path.display(), "closed log file");
        }
        Ok(())
    }
}
