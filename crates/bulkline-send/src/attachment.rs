use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bulkline_client::{BlobClient, ClientError};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::UploadError;

/// File types the composer accepts. Anything else is silently dropped,
/// matching the image-only file picker.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, ct)| *ct)
}

/// A locally picked image, pending or completed upload.
///
/// The preview handle is released only on explicit removal or set
/// teardown — never after upload, so thumbnails stay visible post-send.
pub struct ImageAttachment {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: &'static str,
    data: Vec<u8>,
    preview: Option<String>,
    pub uploaded: bool,
    pub remote_url: Option<String>,
}

impl ImageAttachment {
    fn new(file_name: &str, content_type: &'static str, data: Vec<u8>) -> Self {
        let preview = format!("data:{};base64,{}", content_type, B64.encode(&data));
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            content_type,
            data,
            preview: Some(preview),
            uploaded: false,
            remote_url: None,
        }
    }

    /// Inline preview URI, present until the attachment is released.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    fn release_preview(&mut self) {
        self.preview = None;
    }
}

/// Destination for attachment bytes. Implemented by [`BlobClient`]; tests
/// substitute counting or failing uploaders.
#[allow(async_fn_in_trait)]
pub trait Uploader {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ClientError>;
}

impl Uploader for BlobClient {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ClientError> {
        self.upload(path, bytes, content_type).await
    }
}

/// The attachments staged on the composer, in pick order.
#[derive(Default)]
pub struct AttachmentSet {
    items: Vec<ImageAttachment>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage image files. Non-image files and unreadable paths are skipped
    /// with a log line; returns how many attachments were added.
    pub fn add_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> usize {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };
            if self.add_bytes(file_name, data).is_some() {
                added += 1;
            }
        }
        added
    }

    /// Stage one file by name and contents. Returns the generated id, or
    /// `None` when the name is not image-typed.
    pub fn add_bytes(&mut self, file_name: &str, data: Vec<u8>) -> Option<Uuid> {
        let content_type = content_type_for(file_name)?;
        let item = ImageAttachment::new(file_name, content_type, data);
        let id = item.id;
        debug!("staged {} as {}", file_name, id);
        self.items.push(item);
        Some(id)
    }

    /// Release the preview and drop the attachment. No-op for unknown ids.
    pub fn remove(&mut self, id: Uuid) {
        if let Some(pos) = self.items.iter().position(|a| a.id == id) {
            let mut item = self.items.remove(pos);
            item.release_preview();
        }
    }

    /// Batch teardown: release every preview and drop the set.
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.release_preview();
        }
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAttachment> {
        self.items.iter()
    }

    /// Upload every not-yet-uploaded attachment, one blocking await at a
    /// time so upload order matches pick order and a partial failure can
    /// resume by position. Returns the full URL list (cached URLs for
    /// attachments uploaded earlier) in attachment order. The first
    /// failure aborts the remainder; flags set so far survive for retry.
    pub async fn upload_all<U: Uploader>(&mut self, uploader: &U) -> Result<Vec<String>, UploadError> {
        let mut urls = Vec::with_capacity(self.items.len());
        for item in &mut self.items {
            if item.uploaded {
                if let Some(url) = &item.remote_url {
                    urls.push(url.clone());
                }
                continue;
            }

            let path = format!("messages/{}_{}", Utc::now().timestamp_millis(), item.file_name);
            let url = uploader
                .put_object(&path, item.data.clone(), item.content_type)
                .await
                .map_err(|source| UploadError {
                    file_name: item.file_name.clone(),
                    source,
                })?;
            item.uploaded = true;
            item.remote_url = Some(url.clone());
            urls.push(url);
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every upload; fails on file names listed in `fail_on`.
    #[derive(Default)]
    struct FakeBucket {
        calls: AtomicUsize,
        paths: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Uploader for FakeBucket {
        async fn put_object(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(name) = self.fail_on {
                if path.ends_with(name) {
                    return Err(ClientError::Status(reqwest::StatusCode::BAD_GATEWAY));
                }
            }
            self.paths.lock().unwrap().push(path.to_string());
            Ok(format!("https://cdn.example.test/{}", path))
        }
    }

    #[test]
    fn non_image_files_are_silently_dropped() {
        let mut set = AttachmentSet::new();
        assert!(set.add_bytes("notes.txt", b"hi".to_vec()).is_none());
        assert!(set.add_bytes("pic.PNG", vec![1, 2, 3]).is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().content_type, "image/png");
    }

    #[test]
    fn remove_releases_the_preview_and_ignores_unknown_ids() {
        let mut set = AttachmentSet::new();
        let id = set.add_bytes("a.jpg", vec![0; 8]).unwrap();
        assert!(set.iter().next().unwrap().preview().unwrap().starts_with("data:image/jpeg;base64,"));

        set.remove(Uuid::new_v4()); // absent: no-op
        assert_eq!(set.len(), 1);

        set.remove(id);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn upload_all_is_idempotent_per_attachment() {
        let mut set = AttachmentSet::new();
        set.add_bytes("a.jpg", vec![1]).unwrap();
        set.add_bytes("b.png", vec![2]).unwrap();

        let bucket = FakeBucket::default();
        let urls = set.upload_all(&bucket).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(bucket.calls.load(Ordering::SeqCst), 2);

        // Second pass: all cached, zero network uploads.
        let again = set.upload_all(&bucket).await.unwrap();
        assert_eq!(again, urls);
        assert_eq!(bucket.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upload_paths_are_timestamp_prefixed_and_ordered() {
        let mut set = AttachmentSet::new();
        set.add_bytes("first.jpg", vec![1]).unwrap();
        set.add_bytes("second.png", vec![2]).unwrap();

        let bucket = FakeBucket::default();
        set.upload_all(&bucket).await.unwrap();

        let paths = bucket.paths.lock().unwrap();
        assert!(paths[0].starts_with("messages/"));
        assert!(paths[0].ends_with("_first.jpg"));
        assert!(paths[1].ends_with("_second.png"));
    }

    #[tokio::test]
    async fn failed_upload_aborts_but_keeps_earlier_flags() {
        let mut set = AttachmentSet::new();
        set.add_bytes("ok.jpg", vec![1]).unwrap();
        set.add_bytes("bad.png", vec![2]).unwrap();
        set.add_bytes("never.gif", vec![3]).unwrap();

        let bucket = FakeBucket { fail_on: Some("bad.png"), ..Default::default() };
        let err = set.upload_all(&bucket).await.unwrap_err();
        assert_eq!(err.file_name, "bad.png");
        // ok.jpg uploaded, bad.png attempted, never.gif aborted.
        assert_eq!(bucket.calls.load(Ordering::SeqCst), 2);

        let flags: Vec<bool> = set.iter().map(|a| a.uploaded).collect();
        assert_eq!(flags, [true, false, false]);

        // Retry only re-sends the failed and the never-attempted ones.
        let retry = FakeBucket::default();
        set.upload_all(&retry).await.unwrap();
        assert_eq!(retry.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clear_tears_the_whole_set_down() {
        let mut set = AttachmentSet::new();
        set.add_bytes("a.webp", vec![1]).unwrap();
        set.add_bytes("b.gif", vec![2]).unwrap();
        set.clear();
        assert!(set.is_empty());
    }
}
