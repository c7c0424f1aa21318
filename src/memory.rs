//! In-memory [`Filesystem`] for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::Filesystem;

/// A [`Filesystem`] that keeps directories and file contents in memory.
///
/// Besides modelling storage it records handle activity and can be told to
/// fail individual operations.
#[derive(Debug, Default, Clone)]
pub struct MemoryFilesystem {
    dirs: BTreeSet<PathBuf>,
    readonly: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    open: Option<PathBuf>,
    opens: usize,
    closes: usize,
    fail_mkdir: bool,
    fail_write: bool,
    fail_mv: bool,
}

impl MemoryFilesystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a writable directory (and its parents).
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_dir(&path.into());
        self
    }

    /// Add a directory that exists but rejects writes.
    pub fn with_readonly_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_dir(&path);
        self.readonly.insert(path);
        self
    }

    /// Make every `mkdir` fail.
    pub fn failing_mkdir(mut self) -> Self {
        self.fail_mkdir = true;
        self
    }

    /// Make every `write` fail.
    pub fn failing_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    /// Make every `mv` fail.
    pub fn failing_mv(mut self) -> Self {
        self.fail_mv = true;
        self
    }

    /// Replace the contents of a file, creating it if needed.
    pub fn set_contents(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    /// Contents of a file.
    pub fn contents(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Contents of a file as text.
    pub fn read_to_string(&self, path: &Path) -> Option<String> {
        self.contents(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Files directly inside `dir`, sorted by path.
    pub fn files_in(&self, dir: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect()
    }

    /// Path of the open handle, if any.
    pub fn open_path(&self) -> Option<&Path> {
        self.open.as_deref()
    }

    /// Number of handles opened so far.
    pub fn opens(&self) -> usize {
        self.opens
    }

    /// Number of handles closed so far.
    pub fn closes(&self) -> usize {
        self.closes
    }

    fn add_dir(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn parent_writable(&self, path: &Path) -> io::Result<()> {
        let parent = path.parent().unwrap_or(Path::new(""));
        if !self.dirs.contains(parent) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", parent.display()),
            ));
        }
        if self.readonly.contains(parent) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only directory: {}", parent.display()),
            ));
        }
        Ok(())
    }
}

impl Filesystem for MemoryFilesystem {
    fn check_path(&self, path: &Path) -> bool {
        self.dirs.contains(path) && !self.readonly.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn mkdir(&mut self, path: &Path) -> io::Result<()> {
        if self.fail_mkdir {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mkdir disabled",
            ));
        }
        if self.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", path.display()),
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        self.files
            .get(path)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.open.as_deref() != Some(path) {
            self.close()?;
            self.parent_writable(path)?;
            self.open = Some(path.to_path_buf());
            self.opens += 1;
        }
        if self.fail_write {
            return Err(io::Error::other("write disabled"));
        }
        self.files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(bytes);
        Ok(())
    }

    fn mv(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail_mv {
            return Err(io::Error::other("rename disabled"));
        }
        self.parent_writable(to)?;
        let bytes = self.files.remove(from).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", from.display()),
            )
        })?;
        self.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.open.take().is_some() {
            self.closes += 1;
        }
        Ok(())
    }
}
