use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Contact;

/// Response of `GET {api_base}/getAllCustomer`.
#[derive(Debug, Deserialize)]
pub struct CustomerListResponse {
    pub results: Vec<Contact>,
}

/// Body of `POST {api_base}/createCustomer`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub phone: String,
    pub name: String,
    pub tags: Vec<String>,
    pub added_date: DateTime<Utc>,
}

/// Body of `POST {api_base}/sendBulkMessage`. The backend fans the message
/// out to every listed number; `image_url` is the empty string when the
/// message carries no image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendRequest {
    pub phone_numbers: Vec<String>,
    pub message: String,
    pub image_url: String,
}

/// Acknowledgement from the dispatch endpoint. The contract gives no
/// per-recipient breakdown, so every field is optional and tolerated.
#[derive(Debug, Default, Deserialize)]
pub struct BulkSendResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of a blob upload: the publicly fetchable download URL.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BlobListResponse {
    pub items: Vec<BlobEntry>,
}
