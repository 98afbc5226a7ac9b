//! Host trait definitions
//!
//! Each trait is a narrow window onto something the panel does not own:
//! the mail client, the embedded frame, the hosting page and the CRM's own
//! UI helpers. Implementations are injected into the components that need them.

use super::types::{
    BodyCallback, CoercionType, MailItemSnapshot, NotificationMessage, PickerParams,
    QuickCreateParams, SelectCallback,
};

/// The currently open mail item, as exposed by the host mail API
pub trait MailItem: Send + Sync {
    /// Read the synchronous item metadata
    fn snapshot(&self) -> MailItemSnapshot;

    /// Request the item body; `callback` is invoked exactly once with the result
    fn get_body_async(&self, coercion: CoercionType, callback: BodyCallback);

    /// EWS endpoint of the mailbox, when the host exposes one
    fn ews_url(&self) -> Option<String>;
}

/// The embedded CRM frame
pub trait Frame: Send + Sync {
    /// Point the frame at a new location (starts a navigation)
    fn set_location(&self, url: &str);

    /// Current frame location, if it has navigated at all
    fn location(&self) -> Option<String>;
}

/// Raw busy spinner drawn over the frame
pub trait ProgressIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Host notification area
///
/// A message replaces any previous message stored under the same key.
pub trait NotificationSurface: Send + Sync {
    fn replace(&self, key: &str, message: NotificationMessage);
}

/// The page hosting the panel
pub trait PageHost: Send + Sync {
    /// Reload the whole page, re-fetching the panel from the CRM
    fn reload(&self);
}

/// The CRM quick-create form
pub trait QuickCreateSurface: Send + Sync {
    fn create_record(&self, module: &str, params: QuickCreateParams);
}

/// The CRM record list modal
pub trait RecordPicker: Send + Sync {
    fn show_records_list(&self, params: PickerParams, on_select: SelectCallback);
}

/// Application-wide translation lookup
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}
