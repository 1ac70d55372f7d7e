//! Transport layer for the git smart HTTP protocol.
//!
//! Two endpoints exist under a remote URL: `GET /info/refs?service=…`
//! for capability discovery and `POST /git-upload-pack` for the fetch
//! exchange. All I/O is blocking; there is no retry and no concurrency.

pub mod credential;
pub mod http;

pub use credential::Credentials;
pub use http::HttpClient;

/// Errors from transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("missing credentials: set {username_var} and {password_var}")]
    MissingCredentials {
        username_var: &'static str,
        password_var: &'static str,
    },

    #[error("unsupported remote URL (expected http:// or https://): {0}")]
    InvalidUrl(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}
