use reqwest::Client as HttpClient;
use tracing::{debug, info};

use bulkline_types::api::{BlobEntry, BlobListResponse, UploadResponse};

use crate::config::RemoteConfig;
use crate::{ClientError, check_status};

/// Prefix under which message images live in the bucket.
pub const MESSAGES_PREFIX: &str = "messages/";

/// Client for the storage bucket holding message images. Objects are
/// publicly fetchable through the URL the upload returns.
#[derive(Clone)]
pub struct BlobClient {
    http: HttpClient,
    base: String,
    key: String,
}

impl BlobClient {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            http: HttpClient::new(),
            base: cfg.blob_base.clone(),
            key: cfg.api_key.clone(),
        }
    }

    /// Upload raw bytes under `path` and return the public download URL.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ClientError> {
        let size = bytes.len();
        let resp = self
            .http
            .post(format!("{}/upload/{}", self.base, path))
            .header("x-api-key", &self.key)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;
        let body: UploadResponse = check_status(resp)?.json().await?;
        info!("uploaded {} ({} bytes)", path, size);
        Ok(body.url)
    }

    /// List objects under a prefix (e.g. [`MESSAGES_PREFIX`]).
    pub async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/list", self.base))
            .query(&[("prefix", prefix)])
            .header("x-api-key", &self.key)
            .send()
            .await?;
        let body: BlobListResponse = check_status(resp)?.json().await?;
        debug!("listed {} objects under {}", body.items.len(), prefix);
        Ok(body.items)
    }

    /// Delete one object. Used by the image-management screen, never by the
    /// send path.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(format!("{}/{}", self.base, path))
            .header("x-api-key", &self.key)
            .send()
            .await?;
        check_status(resp)?;
        info!("deleted {}", path);
        Ok(())
    }
}
