//! Mail context model: a read-only snapshot of the open mail item

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// CRM-side identifier of an imported mail (0 means "not imported")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailId(pub u64);

impl MailId {
    /// Build a mail id from the raw panel attribute, treating 0 as absent
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name (e.g., "Jane Doe")
    pub name: Option<String>,
    /// Email address (e.g., "jane@example.com")
    pub email: String,
}

impl EmailAddress {
    /// Create a new email address with just the email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Display name, or an empty string when the host supplied none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Attachment metadata as reported by the host (content is never read here)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    pub id: String,
    /// Host attachment kind ("file", "item", "cloud")
    pub attachment_type: String,
    pub content_type: String,
    pub is_inline: bool,
    pub name: String,
    pub size: u64,
}

/// Immutable per-session snapshot of the open email
///
/// Built once by [`crate::MailSource::context`]. The HTML body is not part of
/// the snapshot; it is fetched lazily through [`crate::MailSource::body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContext {
    /// Opaque host-assigned item id
    pub item_id: String,
    pub internet_message_id: String,
    pub from: EmailAddress,
    pub sender: EmailAddress,
    /// Recipient addresses, flattened and in host order
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub normalized_subject: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentInfo>,
}

impl MailContext {
    /// Sender address used for the CRM email fields
    pub fn sender_address(&self) -> &str {
        &self.from.email
    }

    /// Sender display name
    pub fn sender_name(&self) -> &str {
        self.from.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_id_zero_is_absent() {
        assert_eq!(MailId::from_raw(0), None);
        assert_eq!(MailId::from_raw(42), Some(MailId(42)));
    }

    #[test]
    fn test_display_name_defaults_to_empty() {
        assert_eq!(EmailAddress::new("a@example.com").display_name(), "");
        assert_eq!(
            EmailAddress::with_name("Jane Doe", "jane@example.com").display_name(),
            "Jane Doe"
        );
    }

    #[test]
    fn test_attachment_serializes_camel_case() {
        let attachment = AttachmentInfo {
            id: "att-1".to_string(),
            attachment_type: "file".to_string(),
            content_type: "application/pdf".to_string(),
            is_inline: false,
            name: "offer.pdf".to_string(),
            size: 1024,
        };
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["attachmentType"], "file");
        assert_eq!(json["contentType"], "application/pdf");
        assert_eq!(json["isInline"], false);
    }
}
