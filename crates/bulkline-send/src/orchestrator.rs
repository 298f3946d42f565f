use std::sync::Arc;

use bulkline_client::{ApiClient, ClientError};
use bulkline_services::HistoryService;
use bulkline_types::api::{BulkSendRequest, BulkSendResponse};
use bulkline_types::models::{Contact, DeliveryStatus, HistoryEntry, ScheduledMessage};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::attachment::{AttachmentSet, Uploader};
use crate::error::SendError;
use crate::progress::SendProgress;
use crate::template::personalize;

/// The single outbound dispatch call. Implemented by [`ApiClient`]; tests
/// substitute recording or failing dispatchers.
#[allow(async_fn_in_trait)]
pub trait Dispatch {
    async fn send_bulk(&self, req: &BulkSendRequest) -> Result<BulkSendResponse, ClientError>;
}

impl Dispatch for ApiClient {
    async fn send_bulk(&self, req: &BulkSendRequest) -> Result<BulkSendResponse, ClientError> {
        self.send_bulk_message(req).await
    }
}

/// Where send outcomes are logged. Append failures are never fatal to the
/// send itself.
pub trait HistorySink {
    fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()>;
}

impl HistorySink for HistoryService {
    fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        HistoryService::append(self, entry)
    }
}

#[derive(Debug)]
pub struct SendOutcome {
    pub dispatched: usize,
    pub image_url: Option<String>,
}

/// Build the dispatch body: one identifier per resolved contact in roster
/// order, the raw (non-personalized) message, and at most the first image
/// URL. Personalization happens per recipient only for preview and the
/// history log; the backend receives the template as typed.
pub fn build_dispatch(
    recipients: &[Contact],
    message: &str,
    image_urls: &[String],
) -> BulkSendRequest {
    BulkSendRequest {
        phone_numbers: recipients.iter().map(|c| c.phone.clone()).collect(),
        message: message.to_string(),
        image_url: image_urls.first().cloned().unwrap_or_default(),
    }
}

/// Validate and build a parked message instead of dispatching now. Same
/// fail-fast rules as [`BulkSender::send`], minus attachments (the
/// schedule path carries text only).
pub fn build_scheduled(
    recipients: &[Contact],
    message: &str,
    scheduled_for: DateTime<Utc>,
) -> Result<ScheduledMessage, SendError> {
    if message.trim().is_empty() {
        return Err(SendError::EmptyMessage);
    }
    if recipients.is_empty() {
        return Err(SendError::NoRecipients);
    }
    Ok(ScheduledMessage {
        id: Uuid::new_v4().to_string(),
        message: message.to_string(),
        contacts: recipients.to_vec(),
        scheduled_for,
        created_at: Utc::now(),
    })
}

/// Drives one end-to-end bulk send: upload attachments, dispatch once,
/// reflect progress, log history. No cancellation mid-send; callers gate
/// re-entry on `progress().is_active()`.
pub struct BulkSender<D, U> {
    dispatch: D,
    uploader: U,
    progress: Arc<SendProgress>,
}

impl<D: Dispatch, U: Uploader> BulkSender<D, U> {
    pub fn new(dispatch: D, uploader: U) -> Self {
        Self {
            dispatch,
            uploader,
            progress: Arc::new(SendProgress::new()),
        }
    }

    /// Handle for the display layer to poll while a send is active.
    pub fn progress(&self) -> Arc<SendProgress> {
        self.progress.clone()
    }

    pub async fn send<H: HistorySink>(
        &self,
        recipients: &[Contact],
        message: &str,
        attachments: &mut AttachmentSet,
        history: &H,
    ) -> Result<SendOutcome, SendError> {
        // Fail fast, before any network call.
        if message.trim().is_empty() && attachments.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if recipients.is_empty() {
            return Err(SendError::NoRecipients);
        }

        // Attachments go up first; a failed upload never reaches the
        // dispatch endpoint. Uploaded flags survive for a retry.
        let image_urls = if attachments.is_empty() {
            Vec::new()
        } else {
            match attachments.upload_all(&self.uploader).await {
                Ok(urls) => urls,
                Err(e) => {
                    self.progress.finish();
                    return Err(e.into());
                }
            }
        };

        self.progress.begin(recipients.len() as u32);

        let req = build_dispatch(recipients, message, &image_urls);
        let resp = self.dispatch.send_bulk(&req).await;
        self.progress.finish();

        let _ack = match resp {
            Ok(ack) => ack,
            Err(e) => {
                error!("bulk dispatch failed: {}", e);
                return Err(SendError::Dispatch(e));
            }
        };

        // The endpoint fans out server-side and reports no per-recipient
        // breakdown, so these counts are a coarse estimate: everything
        // dispatched counts as sent.
        self.progress.record_sent(recipients.len() as u32);

        let now = Utc::now();
        for contact in recipients {
            let entry = HistoryEntry {
                id: Uuid::new_v4().to_string(),
                contact_id: contact.id.clone(),
                contact_name: contact.name.clone(),
                contact_phone: contact.phone.clone(),
                message: personalize(message, contact),
                status: DeliveryStatus::Sent,
                sent_at: now,
                scheduled: false,
            };
            if let Err(e) = history.append(&entry) {
                warn!("history append failed for {}: {:#}", contact.phone, e);
            }
        }

        // Compose state is torn down only once the dispatch response came
        // back without a transport error.
        attachments.clear();

        info!("dispatched bulk message to {} recipients", recipients.len());
        Ok(SendOutcome {
            dispatched: recipients.len(),
            image_url: (!req.image_url.is_empty()).then(|| req.image_url.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeDispatch {
        calls: AtomicUsize,
        last: Mutex<Option<BulkSendRequest>>,
        fail: bool,
    }

    impl Dispatch for &FakeDispatch {
        async fn send_bulk(&self, req: &BulkSendRequest) -> Result<BulkSendResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            *self.last.lock().unwrap() = Some(req.clone());
            Ok(BulkSendResponse::default())
        }
    }

    #[derive(Default)]
    struct FakeBucket {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Uploader for &FakeBucket {
        async fn put_object(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail && path.contains("bad") {
                return Err(ClientError::Status(reqwest::StatusCode::BAD_GATEWAY));
            }
            Ok(format!("https://cdn.example.test/{}", path))
        }
    }

    #[derive(Default)]
    struct MemoryHistory {
        entries: Mutex<Vec<HistoryEntry>>,
    }

    impl HistorySink for MemoryHistory {
        fn append(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn contact(id: &str, phone: &str) -> Contact {
        Contact {
            id: id.into(),
            name: format!("Contact {}", id),
            phone: phone.into(),
            tags: vec![],
            added_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_message_without_attachments_never_dispatches() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();

        let err = sender
            .send(&[contact("1", "111")], "   ", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::EmptyMessage));
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_recipient_set_never_dispatches() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();

        let err = sender
            .send(&[], "hello", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::NoRecipients));
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dispatch_carries_raw_message_and_roster_order_numbers() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();

        let roster = [contact("1", "111"), contact("2", "222")];
        let recipients = crate::resolver::resolve(&["2".to_string()], &roster);

        sender
            .send(&recipients, "Hi {name}", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap();

        let req = dispatch.last.lock().unwrap().clone().unwrap();
        assert_eq!(req.phone_numbers, ["222"]);
        assert_eq!(req.message, "Hi {name}"); // not personalized on the wire
        assert_eq!(req.image_url, "");
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn history_gets_personalized_text_per_recipient() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();
        let history = MemoryHistory::default();

        let recipients = [contact("1", "111"), contact("2", "222")];
        sender.send(&recipients, "Hi {name}", &mut attachments, &history).await.unwrap();

        let entries = history.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Hi Contact 1");
        assert_eq!(entries[1].message, "Hi Contact 2");
        assert_eq!(entries[0].status, DeliveryStatus::Sent);
        assert!(!entries[0].scheduled);
    }

    #[tokio::test]
    async fn upload_failure_aborts_before_dispatch() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket { fail: true, ..Default::default() };
        let sender = BulkSender::new(&dispatch, &bucket);

        let mut attachments = AttachmentSet::new();
        attachments.add_bytes("good.jpg", vec![1]).unwrap();
        attachments.add_bytes("bad.png", vec![2]).unwrap();

        let err = sender
            .send(&[contact("1", "111")], "hello", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Upload(UploadError { .. })));
        assert_eq!(dispatch.calls.load(Ordering::SeqCst), 0);

        // First upload succeeded and stays flagged for the retry.
        let flags: Vec<bool> = attachments.iter().map(|a| a.uploaded).collect();
        assert_eq!(flags, [true, false]);
        assert!(!sender.progress().is_active());
    }

    #[tokio::test]
    async fn first_image_url_rides_along_and_set_clears_on_success() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);

        let mut attachments = AttachmentSet::new();
        attachments.add_bytes("one.jpg", vec![1]).unwrap();
        attachments.add_bytes("two.png", vec![2]).unwrap();

        let outcome = sender
            .send(&[contact("1", "111")], "look", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap();

        let req = dispatch.last.lock().unwrap().clone().unwrap();
        assert!(req.image_url.ends_with("_one.jpg"));
        assert_eq!(outcome.image_url.as_deref(), Some(req.image_url.as_str()));
        assert!(attachments.is_empty()); // teardown after a clean response
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_counts_and_deactivates() {
        let dispatch = FakeDispatch { fail: true, ..Default::default() };
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();

        let err = sender
            .send(&[contact("1", "111")], "hello", &mut attachments, &MemoryHistory::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Dispatch(_)));

        let snap = sender.progress().snapshot();
        assert_eq!((snap.total, snap.sent, snap.failed, snap.active), (1, 0, 0, false));
    }

    #[tokio::test]
    async fn successful_send_counts_everyone_as_sent() {
        let dispatch = FakeDispatch::default();
        let bucket = FakeBucket::default();
        let sender = BulkSender::new(&dispatch, &bucket);
        let mut attachments = AttachmentSet::new();

        let recipients = [contact("1", "111"), contact("2", "222"), contact("3", "333")];
        sender.send(&recipients, "hello", &mut attachments, &MemoryHistory::default()).await.unwrap();

        let snap = sender.progress().snapshot();
        assert_eq!((snap.total, snap.sent, snap.failed, snap.active), (3, 3, 0, false));
        assert_eq!(snap.percent_complete(), 100.0);
    }

    #[test]
    fn build_scheduled_validates_like_send() {
        let when = Utc::now();
        assert!(matches!(
            build_scheduled(&[contact("1", "111")], "  ", when),
            Err(SendError::EmptyMessage)
        ));
        assert!(matches!(build_scheduled(&[], "hi", when), Err(SendError::NoRecipients)));

        let msg = build_scheduled(&[contact("1", "111")], "hi", when).unwrap();
        assert_eq!(msg.scheduled_for, when);
        assert_eq!(msg.contacts[0].phone, "111");
    }
}
