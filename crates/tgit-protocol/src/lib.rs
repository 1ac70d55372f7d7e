//! Git wire protocol: pkt-line framing and the single-want fetch driver.

pub mod fetch;
pub mod pktline;

use tgit_transport::TransportError;

/// Errors from protocol framing and the fetch exchange.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid pkt-line: {0}")]
    InvalidPktLine(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("missing service announcement (expected '# service=git-upload-pack')")]
    MissingServiceAnnouncement,

    #[error("server did not answer the request with NAK")]
    MissingNak,

    #[error("remote has no branch named '{0}'")]
    BranchNotFound(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Pack(#[from] tgit_pack::PackError),

    #[error(transparent)]
    Loose(#[from] tgit_loose::LooseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
