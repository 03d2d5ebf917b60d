//! Filesystem access
//!
//! The scanner and the lock prober only need three things from storage:
//! whether a directory exists, which of its files match a name pattern, and
//! whether a file can be opened exclusively. `Storage` captures exactly that so
//! tests can simulate locked files and access errors without real contention.

pub mod lock;

use chrono::{DateTime, TimeZone, Utc};
use fs2::FileExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{File, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub use lock::{probe, LockState};

/// A file found in a scanned directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskFile {
    /// Absolute or caller-relative path to the file
    pub path: PathBuf,

    /// File name (basename)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Last modification timestamp
    pub modified_at: Option<DateTime<Utc>>,
}

impl DiskFile {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            path,
            name,
            size: 0,
            modified_at: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| Utc.timestamp_opt(d.as_secs() as i64, 0).single());

        Self {
            modified_at,
            ..Self::new(path).with_size(metadata.len())
        }
    }
}

/// Storage capabilities used by a scan
pub trait Storage {
    /// Guard for an exclusive open; dropping it releases the file.
    type Handle;

    /// Whether `path` exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Files directly inside `dir` whose names match `pattern`
    /// (case-insensitive glob), sorted by name.
    fn list_matching(&self, dir: &Path, pattern: &str) -> io::Result<Vec<DiskFile>>;

    /// Open `path` for reading and writing while denying access to everyone else
    fn open_exclusive(&self, path: &Path) -> io::Result<Self::Handle>;
}

/// Convert a glob pattern to an anchored, case-insensitive regex.
///
/// `*` matches any run of characters (newlines included) and `?` a single
/// one; everything else is literal.
pub fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::from("(?is)^");

    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }

    pattern.push('$');
    Regex::new(&pattern)
}

/// The local filesystem (including mounted network shares)
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

/// Exclusive handle on a local file, unlocked and closed on drop
#[derive(Debug)]
pub struct ExclusiveHandle {
    file: File,
}

impl Drop for ExclusiveHandle {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    #[cfg(windows)]
    fn open_read_write(path: &Path) -> io::Result<File> {
        use std::os::windows::fs::OpenOptionsExt;

        // Share mode 0: fail if anyone else has the file open
        OpenOptions::new()
            .read(true)
            .write(true)
            .share_mode(0)
            .open(path)
    }

    #[cfg(not(windows))]
    fn open_read_write(path: &Path) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(path)
    }
}

impl Storage for LocalStorage {
    type Handle = ExclusiveHandle;

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_matching(&self, dir: &Path, pattern: &str) -> io::Result<Vec<DiskFile>> {
        let matcher = glob_to_regex(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut files = Vec::new();

        let walker = walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            if !matcher.is_match(&name) {
                continue;
            }

            // Symlinks count when they point at a regular file
            let metadata = match std::fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            if metadata.is_file() {
                files.push(DiskFile::from_metadata(entry.path().to_path_buf(), &metadata));
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(files)
    }

    fn open_exclusive(&self, path: &Path) -> io::Result<ExclusiveHandle> {
        let file = Self::open_read_write(path)?;

        // Advisory lock catches holders that don't use share modes
        file.try_lock_exclusive()
            .map_err(|e| io::Error::new(io::ErrorKind::WouldBlock, e))?;

        Ok(ExclusiveHandle { file })
    }
}
