use bulkline_client::ClientError;
use thiserror::Error;

/// One attachment failed to reach the bucket. Remaining uploads were
/// aborted; anything uploaded before the failure keeps its flag, so a
/// retry only re-sends the rest.
#[derive(Debug, Error)]
#[error("upload of '{file_name}' failed: {source}")]
pub struct UploadError {
    pub file_name: String,
    #[source]
    pub source: ClientError,
}

/// Why a bulk send did not go through. The validation variants are raised
/// before any network traffic.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("message is empty and no attachments are staged")]
    EmptyMessage,
    #[error("no recipients selected")]
    NoRecipients,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] ClientError),
}
