//! FileRecord - Immutable snapshot of one filesystem entry

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Snapshot of a single filesystem entry captured at scan time.
///
/// Records are taken once per directory listing and embedded in the
/// operations that reference them; they are never refreshed in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    /// Absolute path of the entry
    pub path: PathBuf,

    /// Size in bytes (0 for directories)
    pub size: u64,

    /// Creation time
    pub created: SystemTime,

    /// Last modification time
    pub modified: SystemTime,

    /// Last access time
    pub accessed: SystemTime,

    /// Attribute flags
    pub is_dir: bool,
    pub hidden: bool,
    pub system: bool,
    pub archive: bool,
    pub read_only: bool,
}

/// Key under which a record is stored in a directory listing.
///
/// Two records from different trees denote the same logical entry iff their
/// keys are equal: same kind, same file name. Full paths and metadata are
/// deliberately not part of the key. The derived ordering (files before
/// directories, then case-sensitive name) also fixes the listing order the
/// diff engine walks, so plans are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryKey {
    pub is_dir: bool,
    pub name: OsString,
}

impl FileRecord {
    /// Capture a record for `path` from its filesystem metadata.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let fallback = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let hidden = is_hidden(&path, metadata);
        let (system, archive) = platform_flags(metadata);

        Self {
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            created: metadata.created().unwrap_or(fallback),
            modified: fallback,
            accessed: metadata.accessed().unwrap_or(fallback),
            is_dir: metadata.is_dir(),
            hidden,
            system,
            archive,
            read_only: metadata.permissions().readonly(),
            path,
        }
    }

    /// Final component of the path.
    pub fn file_name(&self) -> OsString {
        self.path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default()
    }

    /// Matching key for cross-tree lookup.
    pub fn key(&self) -> EntryKey {
        EntryKey {
            is_dir: self.is_dir,
            name: self.file_name(),
        }
    }

    /// Full identity: every captured field equal.
    ///
    /// Used to detect whether a re-scanned entry changed. This is a strictly
    /// stronger relation than [`FileRecord::matches`] and the two must not be
    /// conflated.
    pub fn identical(&self, other: &FileRecord) -> bool {
        self == other
    }

    /// Tree-matching equivalence: same kind and same file name.
    ///
    /// This is the relation the diff engine uses to pair a source entry with
    /// its destination counterpart; paths and metadata are ignored.
    pub fn matches(&self, other: &FileRecord) -> bool {
        self.key() == other.key()
    }

    /// Path relative to `root`, or `None` when this record does not live
    /// under `root`. With `with_name == false` the final component is
    /// dropped, leaving the containing folder's relative path.
    pub fn relative_path(&self, root: &Path, with_name: bool) -> Option<PathBuf> {
        let relative = self.path.strip_prefix(root).ok()?;
        if with_name {
            Some(relative.to_path_buf())
        } else {
            relative.parent().map(|p| p.to_path_buf())
        }
    }

    /// Container ordering: directories sort after files; within the same
    /// kind, case-sensitive name order.
    pub fn order(&self, other: &FileRecord) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[cfg(unix)]
fn is_hidden(path: &Path, _metadata: &Metadata) -> bool {
    // Unix convention: dot-files are hidden
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_hidden(_path: &Path, metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(unix)]
fn platform_flags(_metadata: &Metadata) -> (bool, bool) {
    // No system/archive attribute bits on Unix filesystems
    (false, false)
}

#[cfg(windows)]
fn platform_flags(metadata: &Metadata) -> (bool, bool) {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;
    let attrs = metadata.file_attributes();
    (
        attrs & FILE_ATTRIBUTE_SYSTEM != 0,
        attrs & FILE_ATTRIBUTE_ARCHIVE != 0,
    )
}
