//! Loose object storage.
//!
//! Each object lives at `.git/objects/XX/YYYY…` where `XX` is the first
//! two hex characters of its name and `YYYY…` the remaining 38. The file
//! content is the zlib-compressed canonical envelope. The store is
//! additive: an object, once written, is immutable.

mod prefix;
mod read;
mod write;

use std::path::{Path, PathBuf};

use tgit_hash::{HashError, ObjectId};

/// Which part of the loose path was absent on a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPiece {
    FanoutDirectory,
    ObjectFile,
}

impl std::fmt::Display for MissingPiece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FanoutDirectory => "fan-out directory",
            Self::ObjectFile => "object file",
        })
    }
}

/// Errors from loose object operations.
#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("object {oid} not found: missing {piece}")]
    NotFound { oid: ObjectId, piece: MissingPiece },

    #[error("invalid object prefix '{0}'")]
    InvalidPrefix(String),

    #[error("no object matches prefix '{0}'")]
    PrefixNotFound(String),

    #[error("ambiguous object prefix '{prefix}': {count} matches")]
    AmbiguousPrefix { prefix: String, count: usize },

    #[error("corrupt loose object {oid}: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error("decompression failed for {oid}: {source}")]
    Decompress {
        oid: ObjectId,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] tgit_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Interface to a `.git/objects` directory.
pub struct LooseObjectStore {
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    /// Open the store rooted at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
        }
    }

    /// The objects directory this store is rooted at.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The on-disk path for an object id.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_uses_fanout() {
        let store = LooseObjectStore::open("/repo/.git/objects");
        let oid = ObjectId::from_hex("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391").unwrap();
        assert_eq!(
            store.object_path(&oid),
            PathBuf::from("/repo/.git/objects/e6/9de29bb2d1d6434b8b29ae775ad8c2e48c5391")
        );
    }
}
