//! Host environment abstractions
//!
//! This module defines the seams between the panel core and everything it
//! talks to: the mail item, the embedded frame, the page, notifications, and
//! the CRM's quick-create form and record picker. Components receive these as
//! `Arc<dyn Trait>` instead of reaching for process-wide globals.

pub mod memory;
mod traits;
mod translate;
mod types;

pub use traits::{
    Frame, MailItem, NotificationSurface, PageHost, ProgressIndicator, QuickCreateSurface,
    RecordPicker, Translator,
};
pub use translate::{LayeredTranslator, MapTranslator};
pub use types::{
    AddressField, AsyncResult, AsyncStatus, BodyCallback, CoercionType, CreateCallback,
    CreatedRecord, HostError, MailItemSnapshot, NotificationKind, NotificationMessage,
    PickerParams, QuickCreateParams, SelectCallback,
};
