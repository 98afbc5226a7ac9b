//! Embedded frame controller
//!
//! Owns navigation of the embedded CRM view and the "active" marker of the
//! list panel. The two are coupled: selecting an entry always moves the frame
//! to that entry's URL.

use log::{debug, info, warn};
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{PanelError, Result};
use crate::host::Frame;
use crate::loader::LoadingIndicator;
use crate::models::{RecordId, RelatedRecordEntry};

struct FrameState {
    entries: Vec<RelatedRecordEntry>,
    active: Option<usize>,
}

/// Navigation state of the embedded CRM frame
pub struct FrameController {
    frame: Arc<dyn Frame>,
    loader: Arc<LoadingIndicator>,
    base_url: Option<Url>,
    state: RwLock<FrameState>,
}

impl FrameController {
    pub fn new(
        frame: Arc<dyn Frame>,
        loader: Arc<LoadingIndicator>,
        entries: Vec<RelatedRecordEntry>,
    ) -> Self {
        Self {
            frame,
            loader,
            base_url: None,
            state: RwLock::new(FrameState {
                entries,
                active: None,
            }),
        }
    }

    /// Resolve relative entry links against the CRM base URL
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Show the first entry, or settle immediately when there is nothing to show
    pub fn initialize(&self) {
        self.loader.begin();
        let first = self.state.read().unwrap().entries.first().map(|e| e.id);
        match first {
            Some(id) => {
                // First entry always exists here
                let _ = self.select_entry(id);
            }
            None => {
                debug!("No related records, nothing to load");
                self.loader.end();
            }
        }
    }

    /// Point the frame at `url` and enter the busy state
    ///
    /// Does not touch the active marker.
    pub fn navigate(&self, url: &str) {
        let target = self.resolve(url);
        debug!("Navigating frame to {}", target);
        self.frame.set_location(&target);
        self.loader.begin();
    }

    /// Mark the entry active (deactivating the others) and navigate to it
    ///
    /// Selecting the already-active entry re-navigates.
    pub fn select_entry(&self, id: RecordId) -> Result<RelatedRecordEntry> {
        let entry = {
            let mut state = self.state.write().unwrap();
            let Some(index) = state.entries.iter().position(|e| e.id == id) else {
                warn!("Cannot select unknown entry {}", id);
                return Err(PanelError::UnknownEntry(id));
            };
            state.active = Some(index);
            state.entries[index].clone()
        };
        info!("Selected {} {}", entry.module, entry.id);
        self.navigate(&entry.url);
        Ok(entry)
    }

    /// The frame finished loading its current target
    pub fn on_load_settled(&self) {
        self.loader.end();
    }

    /// Reload whatever the frame currently shows
    pub fn refresh(&self) {
        match self.frame.location() {
            Some(location) => self.navigate(&location),
            None => debug!("Frame has no location to refresh"),
        }
    }

    pub fn active_entry(&self) -> Option<RelatedRecordEntry> {
        let state = self.state.read().unwrap();
        state.active.map(|i| state.entries[i].clone())
    }

    pub fn entries(&self) -> Vec<RelatedRecordEntry> {
        self.state.read().unwrap().entries.clone()
    }

    pub fn entry(&self, id: RecordId) -> Option<RelatedRecordEntry> {
        self.state
            .read()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub fn location(&self) -> Option<String> {
        self.frame.location()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_busy()
    }

    /// Absolute form of an entry link
    pub fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => match base.join(href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!("Could not resolve {} against {}: {}", href, base, e);
                    href.to_string()
                }
            },
            None => href.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{RecordingFrame, RecordingIndicator};

    struct Fixture {
        controller: FrameController,
        frame: Arc<RecordingFrame>,
        spinner: Arc<RecordingIndicator>,
    }

    fn fixture(entries: Vec<RelatedRecordEntry>) -> Fixture {
        let frame = Arc::new(RecordingFrame::new());
        let spinner = Arc::new(RecordingIndicator::new());
        let loader = Arc::new(LoadingIndicator::new(spinner.clone()));
        Fixture {
            controller: FrameController::new(frame.clone(), loader, entries),
            frame,
            spinner,
        }
    }

    fn entries() -> Vec<RelatedRecordEntry> {
        vec![
            RelatedRecordEntry::new(5, "Contacts", "https://crm.example.com/contacts/5"),
            RelatedRecordEntry::new(9, "Leads", "https://crm.example.com/leads/9"),
        ]
    }

    #[test]
    fn test_initialize_selects_first_entry() {
        let f = fixture(entries());
        f.controller.initialize();

        assert_eq!(f.controller.active_entry().unwrap().id, RecordId(5));
        assert_eq!(
            f.frame.location().as_deref(),
            Some("https://crm.example.com/contacts/5")
        );
        assert!(f.controller.is_loading());

        f.controller.on_load_settled();
        assert!(!f.controller.is_loading());
        assert!(!f.spinner.is_visible());
    }

    #[test]
    fn test_initialize_empty_list_settles() {
        let f = fixture(Vec::new());
        f.controller.initialize();

        assert!(f.controller.active_entry().is_none());
        assert!(f.frame.history().is_empty());
        assert!(!f.controller.is_loading());
    }

    #[test]
    fn test_select_moves_active_and_frame() {
        let f = fixture(entries());
        f.controller.initialize();
        f.controller.on_load_settled();

        let entry = f.controller.select_entry(RecordId(9)).unwrap();

        assert_eq!(entry.module, "Leads");
        assert_eq!(f.controller.active_entry().unwrap().id, RecordId(9));
        assert_eq!(f.frame.location().unwrap(), entry.url);
        assert!(f.controller.is_loading());
    }

    #[test]
    fn test_reselect_active_renavigates() {
        let f = fixture(entries());
        f.controller.initialize();
        f.controller.on_load_settled();

        f.controller.select_entry(RecordId(5)).unwrap();

        assert_eq!(f.frame.history().len(), 2);
        assert_eq!(f.controller.active_entry().unwrap().id, RecordId(5));
    }

    #[test]
    fn test_select_unknown_entry() {
        let f = fixture(entries());
        let err = f.controller.select_entry(RecordId(77)).unwrap_err();
        assert!(matches!(err, PanelError::UnknownEntry(RecordId(77))));
        assert!(f.frame.history().is_empty());
    }

    #[test]
    fn test_navigate_keeps_active_marker() {
        let f = fixture(entries());
        f.controller.initialize();

        f.controller.navigate("https://crm.example.com/popover/link");

        assert_eq!(f.controller.active_entry().unwrap().id, RecordId(5));
        assert_eq!(
            f.frame.location().as_deref(),
            Some("https://crm.example.com/popover/link")
        );
    }

    #[test]
    fn test_busy_for_every_navigation() {
        let f = fixture(entries());
        for id in [5, 9, 5, 9] {
            f.controller.select_entry(RecordId(id)).unwrap();
            assert!(f.controller.is_loading());
            f.controller.on_load_settled();
            assert!(!f.controller.is_loading());
        }
        assert_eq!(f.spinner.show_count(), 4);
        assert_eq!(f.spinner.hide_count(), 4);
    }

    #[test]
    fn test_relative_links_resolved() {
        let base = Url::parse("https://crm.example.com/").unwrap();
        let frame = Arc::new(RecordingFrame::new());
        let loader = Arc::new(LoadingIndicator::new(Arc::new(RecordingIndicator::new())));
        let controller = FrameController::new(
            frame.clone(),
            loader,
            vec![RelatedRecordEntry::new(
                5,
                "Contacts",
                "index.php?module=Contacts&view=Detail&record=5",
            )],
        )
        .with_base_url(base);

        controller.initialize();

        assert_eq!(
            frame.location().as_deref(),
            Some("https://crm.example.com/index.php?module=Contacts&view=Detail&record=5")
        );
    }

    #[test]
    fn test_refresh_renavigates_current_location() {
        let f = fixture(entries());
        f.controller.initialize();
        f.controller.on_load_settled();

        f.controller.refresh();

        assert_eq!(
            f.frame.history(),
            vec![
                "https://crm.example.com/contacts/5".to_string(),
                "https://crm.example.com/contacts/5".to_string(),
            ]
        );
        assert!(f.controller.is_loading());
    }
}
