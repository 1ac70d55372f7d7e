//! Object identity for the tgit git client.
//!
//! Provides the [`ObjectId`] type (a 20-byte SHA-1 digest), the hex
//! codec it is displayed in, and streaming hash computation over the
//! canonical object envelope.

pub mod hex;
mod hasher;
mod oid;

pub use hasher::Hasher;
pub use oid::ObjectId;

/// Errors produced by hash and object-id operations.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("invalid hex character at position {position}: '{character}'")]
    InvalidHex { position: usize, character: char },

    #[error("invalid hex length: expected {expected}, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },
}
