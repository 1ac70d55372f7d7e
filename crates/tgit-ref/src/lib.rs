//! Reference files.
//!
//! This client keeps refs as loose files only: `.git/HEAD`, and
//! `.git/refs/heads/<name>` / `.git/refs/tags/<name>` holding a 40-hex
//! object id. Direct refs are written without a trailing newline;
//! readers trim and accept either form.

mod name;
mod store;

pub use name::RefName;
pub use store::RefStore;

use tgit_hash::{HashError, ObjectId};

/// Errors from reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("invalid ref name: {0}")]
    InvalidName(String),

    #[error("malformed ref file {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("symbolic ref chain too deep resolving {0}")]
    ChainTooDeep(String),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Util(#[from] tgit_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A resolved reference: either a direct object id or a pointer to
/// another ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct(ObjectId),
    Symbolic(RefName),
}
