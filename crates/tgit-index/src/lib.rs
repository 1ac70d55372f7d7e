//! The staging index (`.git/index`).
//!
//! Binary format: a `DIRC` header with version and entry count, fixed
//! 62-byte entry prefixes followed by NUL-terminated paths padded to an
//! 8-byte boundary, and a trailing SHA-1 over everything before it.
//! This client reads and writes version 2 only.

pub mod entry;
mod read;
mod write;

use std::path::Path;

use bstr::{BStr, ByteSlice};
use tgit_hash::ObjectId;
use tgit_loose::LooseObjectStore;

pub use entry::{IndexEntry, StatData};

/// Errors from index reading and writing.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index header: {0}")]
    InvalidHeader(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("index checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid index entry at offset {offset}: {reason}")]
    InvalidEntry { offset: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Util(#[from] tgit_utils::UtilError),

    #[error(transparent)]
    Loose(#[from] tgit_loose::LooseError),
}

/// The staging index: entries sorted by path.
#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the index file. A missing file yields an empty index, the
    /// state of a freshly initialized repository.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        match std::fs::read(path.as_ref()) {
            Ok(data) => read::parse_index(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(IndexError::Io(e)),
        }
    }

    /// Write the index atomically through a lock file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &BStr) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_bstr().cmp(path))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Add or replace the entry for a path, keeping sort order.
    pub fn add(&mut self, entry: IndexEntry) {
        match self
            .entries
            .binary_search_by(|e| e.path.cmp(&entry.path))
        {
            Ok(i) => self.entries[i] = entry,
            Err(i) => self.entries.insert(i, entry),
        }
    }

    /// Remove the entry for a path. Returns whether one was removed.
    pub fn remove(&mut self, path: &BStr) -> bool {
        match self
            .entries
            .binary_search_by(|e| e.path.as_bstr().cmp(path))
        {
            Ok(i) => {
                self.entries.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Build nested tree objects from the entries and return the root
    /// tree id.
    pub fn write_tree(&self, store: &LooseObjectStore) -> Result<ObjectId, IndexError> {
        write::write_tree_from_index(self, store)
    }

    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub(crate) fn push_parsed(&mut self, entry: IndexEntry) {
        self.entries.push(entry);
    }
}
