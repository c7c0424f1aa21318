use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serializer, de};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::{Filesystem, Result};

/// Number of bytes in a megabyte.
pub const BYTES_IN_MB: u64 = 1024 * 1024;

/// Extension shared by active and archived log files.
pub const LOG_EXTENSION: &str = "log";

/// Suffix of archived files, e.g. `2026-01-09_14:03:27`.
const ARCHIVE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]:[minute]:[second]");

/// Parse a size string with optional units (B/K/M/G, case-insensitive), defaulting to MB if no unit.
pub fn parse_size(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    let Some(last) = s.chars().last() else {
        return Err("empty size string".to_string());
    };

    let (num_str, unit) = if last.is_ascii_alphabetic() {
        (&s[..s.len() - 1], last.to_ascii_uppercase())
    } else {
        (s, 'M') // Default to MB
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let multiplier = match unit {
        'B' => 1,
        'K' => 1024,
        'M' => BYTES_IN_MB,
        'G' => 1024 * BYTES_IN_MB,
        _ => return Err(format!("invalid unit: {}, supported: B/K/M/G", unit)),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| "size too large".to_string())
}

/// Size value that can be a number of megabytes or a string with units.
#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Number(u64),
    String(String),
}

impl SizeValue {
    fn to_bytes(&self) -> std::result::Result<u64, String> {
        match self {
            SizeValue::Number(n) => n
                .checked_mul(BYTES_IN_MB)
                .ok_or_else(|| "size too large".to_string()),
            SizeValue::String(s) => parse_size(s),
        }
    }
}

/// Deserialize a maximum file size given in megabytes or with a B/K/M/G unit.
pub(crate) fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    SizeValue::deserialize(deserializer)?
        .to_bytes()
        .map_err(de::Error::custom)
}

/// Serialize a size in bytes so that [`deserialize_size`] reads it back unchanged.
pub(crate) fn serialize_size<S>(bytes: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{}B", bytes))
}

/// Paths and size limit for one named log.
///
/// The active file is `<dir>/<name>.log`; archives sit next to it as
/// `<name>_<YYYY-MM-DD_HH:MM:SS>.log`. Archive names have one-second
/// resolution, so two rotations within the same second share a name and the
/// later rename replaces the earlier archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    dir: PathBuf,
    name: String,
    max_size: u64,
}

impl Rotation {
    /// Create a rotation policy for `name` inside `dir`.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, max_size: u64) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            max_size,
        }
    }

    /// Directory holding the active file and its archives.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Size in bytes at which the active file is archived.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Path of the active file.
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.name, LOG_EXTENSION))
    }

    /// Path an active file archived at `at` is renamed to.
    pub fn archive_path(&self, at: OffsetDateTime) -> Result<PathBuf> {
        let stamp = at.format(ARCHIVE_TIMESTAMP_FORMAT)?;
        Ok(self
            .dir
            .join(format!("{}_{}.{}", self.name, stamp, LOG_EXTENSION)))
    }

    /// Whether the active file exists and has reached the size limit.
    pub fn needs_rotation<F: Filesystem + ?Sized>(&self, fs: &F) -> Result<bool> {
        let active = self.active_path();
        if !fs.exists(&active) {
            return Ok(false);
        }
        Ok(fs.file_size(&active)? >= self.max_size)
    }

    /// Archive the active file if it is full.
    ///
    /// Returns the archive path when a rotation happened. The open handle is
    /// closed after the rename so the next write starts a fresh active file.
    pub fn rotate_if_needed<F: Filesystem + ?Sized>(
        &self,
        fs: &mut F,
        at: OffsetDateTime,
    ) -> Result<Option<PathBuf>> {
        if !self.needs_rotation(fs)? {
            return Ok(None);
        }

        let active = self.active_path();
        let archive = self.archive_path(at)?;
        fs.mv(&active, &archive)?;
        fs.close()?;

        tracing::info!(
            active = %active.display(),
            archive = %archive.display(),
            max_size = self.max_size,
            "rotated log file"
        );
        Ok(Some(archive))
    }
}
