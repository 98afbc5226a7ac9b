//! Values exchanged with the host environment

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{AttachmentInfo, EmailAddress, RecordId};

/// Body format requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionType {
    Html,
}

/// Status field of a host async result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncStatus {
    Succeeded,
    Failed,
}

/// Failure payload attached to a failed host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub name: String,
    pub message: String,
    pub code: i32,
}

/// Result object handed to a host callback
///
/// Failures are reported through `status`, never by panicking or erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncResult<T> {
    pub status: AsyncStatus,
    pub value: Option<T>,
    pub error: Option<HostError>,
}

impl<T> AsyncResult<T> {
    pub fn succeeded(value: T) -> Self {
        Self {
            status: AsyncStatus::Succeeded,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: HostError) -> Self {
        Self {
            status: AsyncStatus::Failed,
            value: None,
            error: Some(error),
        }
    }
}

/// Callback receiving the body of the open item
pub type BodyCallback = Box<dyn FnOnce(AsyncResult<String>) + Send>;

/// An address field the host may expose as one value or as a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressField {
    Single(EmailAddress),
    Many(Vec<EmailAddress>),
}

impl AddressField {
    /// Flatten into plain address strings, preserving host order
    pub fn addresses(&self) -> Vec<String> {
        match self {
            AddressField::Single(addr) => vec![addr.email.clone()],
            AddressField::Many(addrs) => addrs.iter().map(|a| a.email.clone()).collect(),
        }
    }
}

impl Default for AddressField {
    fn default() -> Self {
        AddressField::Many(Vec::new())
    }
}

/// Raw item metadata as read from the host mail API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailItemSnapshot {
    pub item_id: String,
    pub internet_message_id: String,
    pub from: EmailAddress,
    pub sender: EmailAddress,
    pub to: AddressField,
    pub cc: AddressField,
    pub subject: String,
    pub normalized_subject: String,
    pub date_time_created: chrono::DateTime<chrono::Utc>,
    pub attachments: Vec<AttachmentInfo>,
}

/// Notification kinds understood by the host notification surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Informational,
    Error,
}

/// A message placed on the notification surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub kind: NotificationKind,
    pub message: String,
    pub icon: Option<String>,
    /// Error messages stay until replaced; informational ones are transient
    pub persistent: bool,
}

/// Identity of a record created through the quick-create surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    #[serde(rename = "_recordId")]
    pub record_id: RecordId,
}

/// Callback invoked once the quick-create form saved a record
pub type CreateCallback = Box<dyn FnOnce(CreatedRecord) + Send>;

/// Configuration bag passed to the quick-create surface
pub struct QuickCreateParams {
    /// Field values pre-filled in the form
    pub data: Map<String, Value>,
    pub callback: Option<CreateCallback>,
    pub no_cache: bool,
}

impl QuickCreateParams {
    pub fn new() -> Self {
        Self {
            data: Map::new(),
            callback: None,
            no_cache: true,
        }
    }

    pub fn with_callback(mut self, callback: impl FnOnce(CreatedRecord) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl Default for QuickCreateParams {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QuickCreateParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickCreateParams")
            .field("data", &self.data)
            .field("callback", &self.callback.is_some())
            .field("no_cache", &self.no_cache)
            .finish()
    }
}

/// Parameters of the record picker (`module`, `src_module`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerParams {
    pub module: String,
    pub src_module: String,
}

/// Callback invoked with the record chosen in the picker
pub type SelectCallback = Box<dyn FnOnce(RecordId) + Send>;
