//! Packfile ingest for the tgit git client.
//!
//! A fetched pack is decoded in a single streaming pass: undeltified
//! objects are written straight into the loose store, delta records are
//! queued and resolved to a fixed point against bases that may arrive
//! in any order. The pack itself is never kept on disk.

pub mod delta;
pub mod entry;
mod ingest;
mod resolve;
pub mod zlib;

pub use ingest::{ingest_pack, IngestOutcome};

use tgit_hash::{HashError, ObjectId};

/// Errors from pack decoding and delta resolution.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid pack: {0}")]
    InvalidHeader(String),

    #[error("unknown pack entry type {type_num} at offset {offset}")]
    UnknownEntryType { type_num: u8, offset: u64 },

    #[error("corrupt pack entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("invalid delta at offset {offset}: {reason}")]
    InvalidDelta { offset: u64, reason: String },

    #[error("unresolvable deltas: {remaining} record(s) have no reachable base")]
    UnresolvableDelta { remaining: usize },

    #[error("pack checksum mismatch: trailer says {expected}, content hashes to {actual}")]
    ChecksumMismatch {
        expected: ObjectId,
        actual: ObjectId,
    },

    #[error(transparent)]
    Loose(#[from] tgit_loose::LooseError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pack stream constants.
pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";
pub const PACK_HEADER_SIZE: usize = 12;
pub const PACK_VERSION: u32 = 2;
