//! Domain models for the panel

mod mail;
mod record;
mod relation;

pub use mail::{AttachmentInfo, EmailAddress, MailContext, MailId};
pub use record::{ModuleOption, RecordId, RecordRef, RelatedRecordEntry};
pub use relation::{RelationMode, RelationMutationRequest};
