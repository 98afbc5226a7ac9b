//! Error types surfaced by panel operations

use crate::models::RecordId;

/// Errors returned by panel gestures and the mail source adapter
///
/// Every variant has already been reported to the user (or deliberately
/// ignored) by the time it reaches the caller; callers only need to log it.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Could not read message body: {name}: {message}")]
    BodyUnavailable { name: String, message: String },

    #[error("Message body retrieval already in progress")]
    BodyInFlight,

    #[error("Host dropped the message body request without answering")]
    BodyDropped,

    #[error("Mail has not been imported; relation operations are unavailable")]
    NoMailId,

    #[error("Mail {0} is already imported")]
    AlreadyImported(u64),

    #[error("No module selected")]
    NoModuleSelected,

    #[error("Unknown list entry: {0}")]
    UnknownEntry(RecordId),

    #[error("Could not encode request payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PanelError>;
