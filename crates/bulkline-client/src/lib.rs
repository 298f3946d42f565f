pub mod api;
pub mod blob;
pub mod config;

pub use api::ApiClient;
pub use blob::BlobClient;
pub use config::RemoteConfig;

use thiserror::Error;

/// Failure of a single remote call. Every variant is caught at the call
/// site, logged, and surfaced to the user once; nothing here crashes the
/// application.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable response body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

pub(crate) fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(ClientError::Status(resp.status()))
    }
}
