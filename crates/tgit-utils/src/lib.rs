//! Foundation utilities shared across the tgit crates.

pub mod date;
pub mod lockfile;

use std::path::PathBuf;

/// Errors produced by the utility modules.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("invalid signature: {0}")]
    SignatureParse(String),

    #[error("lock file already held: {path}")]
    AlreadyLocked { path: PathBuf },

    #[error("lock file error for {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UtilError>;
