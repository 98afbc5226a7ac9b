//! Relation mutation requests

use super::{MailId, RecordId, RelatedRecordEntry};
use serde::{Deserialize, Serialize};

/// Direction of a relation mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationMode {
    Add,
    Delete,
}

impl RelationMode {
    /// Wire value of the `mode` field
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationMode::Add => "addRelation",
            RelationMode::Delete => "deleteRelation",
        }
    }

    /// Translation key of the notification shown after success
    pub fn success_message_key(&self) -> &'static str {
        match self {
            RelationMode::Add => "JS_ADDED_RELATION_SUCCESSFULLY",
            RelationMode::Delete => "JS_REMOVED_RELATION_SUCCESSFULLY",
        }
    }
}

/// A single add/delete relation request, sent once and never retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMutationRequest {
    pub mail_id: MailId,
    pub record_id: RecordId,
    pub record_module: String,
    pub mode: RelationMode,
}

impl RelationMutationRequest {
    pub fn add(mail_id: MailId, record_id: RecordId, record_module: impl Into<String>) -> Self {
        Self {
            mail_id,
            record_id,
            record_module: record_module.into(),
            mode: RelationMode::Add,
        }
    }

    pub fn delete(mail_id: MailId, entry: &RelatedRecordEntry) -> Self {
        Self {
            mail_id,
            record_id: entry.id,
            record_module: entry.module.clone(),
            mode: RelationMode::Delete,
        }
    }
}
