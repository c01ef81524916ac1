//! Boundary traits defined in `secretaria-core` and implemented by other crates.

pub mod notification;
pub mod persistence;
pub mod upload;

pub use notification::{Notification, NotificationLevel, NotificationSink};
pub use persistence::{ChangeSubscription, PersistenceBackend};
pub use upload::{UploadFile, UploadProvider, UploadReceipt, UploadTarget};
