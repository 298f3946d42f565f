pub mod attachment;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod template;

pub use attachment::{AttachmentSet, ImageAttachment, Uploader};
pub use error::{SendError, UploadError};
pub use orchestrator::{BulkSender, Dispatch, HistorySink, SendOutcome};
pub use progress::{ProgressSnapshot, SendProgress};
pub use resolver::resolve;
