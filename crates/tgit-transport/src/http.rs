//! The two smart-HTTP endpoints, over a blocking client.

use crate::{Credentials, TransportError};

/// Service name for the fetch path.
pub const UPLOAD_PACK: &str = "git-upload-pack";

/// A connection to one remote repository URL.
pub struct HttpClient {
    base_url: String,
    credentials: Credentials,
    client: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a client for a repository URL. Only `http` and `https`
    /// schemes are accepted.
    pub fn new(url: &str, credentials: Credentials) -> Result<Self, TransportError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }
        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::blocking::Client::new(),
        })
    }

    /// The repository URL this client talks to.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// `GET <url>/info/refs?service=git-upload-pack`: the pkt-line
    /// framed service announcement and ref advertisement.
    pub fn info_refs(&self) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}/info/refs?service={}", self.base_url, UPLOAD_PACK);
        log::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()?;
        Self::body_or_status(response, &url)
    }

    /// `POST <url>/git-upload-pack` with a pkt-line request body; the
    /// response carries the NAK and the packfile.
    pub fn upload_pack(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}/{}", self.base_url, UPLOAD_PACK);
        log::debug!("POST {url} ({} byte request)", body.len());
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("application/x-{UPLOAD_PACK}-request"),
            )
            .header(
                reqwest::header::ACCEPT,
                format!("application/x-{UPLOAD_PACK}-result"),
            )
            .body(body)
            .send()?;
        Self::body_or_status(response, &url)
    }

    fn body_or_status(
        response: reqwest::blocking::Response,
        url: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}
