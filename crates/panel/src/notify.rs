//! User notifications on the host notification surface

use log::warn;
use std::sync::Arc;

use crate::host::{NotificationKind, NotificationMessage, NotificationSurface, Translator};

/// Key of the informational channel
pub const INFORMATION_KEY: &str = "information";
/// Key of the error channel
pub const ERROR_KEY: &str = "error";

/// Posts informational and error messages, one slot per kind
pub struct Notifier {
    surface: Arc<dyn NotificationSurface>,
    translator: Arc<dyn Translator>,
    icon: Option<String>,
}

impl Notifier {
    pub fn new(surface: Arc<dyn NotificationSurface>, translator: Arc<dyn Translator>) -> Self {
        Self {
            surface,
            translator,
            icon: None,
        }
    }

    /// Icon id attached to informational messages
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Show a transient informational message
    pub fn info(&self, message: &str) {
        self.surface.replace(
            INFORMATION_KEY,
            NotificationMessage {
                kind: NotificationKind::Informational,
                message: message.to_string(),
                icon: self.icon.clone(),
                persistent: false,
            },
        );
    }

    /// Show a persistent error, prefixed with the translated "Error" label
    pub fn error(&self, detail: &str) {
        let prefix = self.translator.translate("JS_ERROR");
        let message = if detail.is_empty() {
            prefix
        } else {
            format!("{} {}", prefix, detail)
        };
        warn!("Showing error notification: {}", message);
        self.surface.replace(
            ERROR_KEY,
            NotificationMessage {
                kind: NotificationKind::Error,
                message,
                icon: None,
                persistent: true,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MapTranslator;
    use crate::host::memory::RecordingNotifications;

    fn notifier() -> (Notifier, Arc<RecordingNotifications>) {
        let surface = Arc::new(RecordingNotifications::new());
        let notifier = Notifier::new(surface.clone(), Arc::new(MapTranslator::english()));
        (notifier, surface)
    }

    #[test]
    fn test_info_uses_information_channel() {
        let (notifier, surface) = notifier();
        notifier.info("Relation added successfully");

        let current = surface.current(INFORMATION_KEY).unwrap();
        assert_eq!(current.kind, NotificationKind::Informational);
        assert_eq!(current.message, "Relation added successfully");
        assert!(!current.persistent);
    }

    #[test]
    fn test_error_is_prefixed_and_persistent() {
        let (notifier, surface) = notifier();
        notifier.error("Permission denied");

        let current = surface.current(ERROR_KEY).unwrap();
        assert_eq!(current.kind, NotificationKind::Error);
        assert_eq!(current.message, "Error Permission denied");
        assert!(current.persistent);
    }

    #[test]
    fn test_generic_error_has_no_trailing_space() {
        let (notifier, surface) = notifier();
        notifier.error("");
        assert_eq!(surface.current(ERROR_KEY).unwrap().message, "Error");
    }

    #[test]
    fn test_same_kind_replaces_previous() {
        let (notifier, surface) = notifier();
        notifier.error("first");
        notifier.error("second");

        assert_eq!(surface.count(ERROR_KEY), 2);
        assert_eq!(surface.current(ERROR_KEY).unwrap().message, "Error second");
    }
}
