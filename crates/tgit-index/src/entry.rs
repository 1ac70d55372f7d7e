//! Index entries and their cached stat data.

use bstr::BString;
use tgit_hash::ObjectId;
use tgit_object::FileMode;

/// One staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the repository root.
    pub path: BString,
    /// Blob id of the staged content.
    pub oid: ObjectId,
    pub mode: FileMode,
    /// Filesystem stat cache used for change detection.
    pub stat: StatData,
}

/// The stat fields the index caches per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatData {
    pub ctime_secs: u32,
    pub ctime_nsecs: u32,
    pub mtime_secs: u32,
    pub mtime_nsecs: u32,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl StatData {
    #[cfg(unix)]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime_secs: meta.ctime() as u32,
            ctime_nsecs: meta.ctime_nsec() as u32,
            mtime_secs: meta.mtime() as u32,
            mtime_nsecs: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }

    #[cfg(not(unix))]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::time::UNIX_EPOCH;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Self {
            ctime_secs: mtime.as_secs() as u32,
            ctime_nsecs: mtime.subsec_nanos(),
            mtime_secs: mtime.as_secs() as u32,
            mtime_nsecs: mtime.subsec_nanos(),
            dev: 0,
            ino: 0,
            uid: 0,
            gid: 0,
            size: meta.len() as u32,
        }
    }

    /// Whether the cached stat still matches the file on disk. A match
    /// means the content can be assumed unchanged without re-hashing.
    pub fn matches(&self, meta: &std::fs::Metadata) -> bool {
        let fresh = Self::from_metadata(meta);
        self.size == fresh.size
            && self.mtime_secs == fresh.mtime_secs
            && self.mtime_nsecs == fresh.mtime_nsecs
            && (self.ino == 0 || fresh.ino == 0 || self.ino == fresh.ino)
    }
}
