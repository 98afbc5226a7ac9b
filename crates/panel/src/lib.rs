//! Panel crate - Core of the CRM mail panel
//!
//! This crate drives the panel shown next to an open mail. It provides:
//! - Relation management between the mail and CRM records
//! - The embedded CRM view with its loading indicator
//! - Mail import and quick-create forms prefilled from the open mail
//! - A form-encoded HTTP connector to the CRM backend
//!
//! Everything the host environment offers (mail item, frame, notifications,
//! quick-create and record picker dialogs) is reached through the traits in
//! [`host`], so the crate has no UI dependencies.

pub mod actions;
pub mod busy;
pub mod config;
pub mod connector;
pub mod error;
pub mod frame;
pub mod host;
pub mod loader;
pub mod mail_source;
pub mod models;
pub mod notify;
pub mod panel;
pub mod prefill;

pub use actions::{MutationOutcome, RelationOrchestrator};
pub use config::PanelConfig;
pub use connector::{ActionConnector, ActionRequest, ActionResponse, HttpTransport, Transport};
pub use error::{PanelError, Result};
pub use frame::FrameController;
pub use loader::LoadingIndicator;
pub use mail_source::{MailDetails, MailSource};
pub use models::{
    AttachmentInfo, EmailAddress, MailContext, MailId, ModuleOption, RecordId, RecordRef,
    RelatedRecordEntry, RelationMode, RelationMutationRequest,
};
pub use notify::Notifier;
pub use panel::{PanelController, PanelData, PanelHost, PanelMode};
pub use prefill::{PrefillRegistry, QuickCreatePrefill};
