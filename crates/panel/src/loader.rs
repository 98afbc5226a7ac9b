//! Busy/idle state of the embedded frame
//!
//! One shared indicator per frame. `begin` while busy and `end` while idle
//! are no-ops, so callers never need to track who turned the spinner on.

use log::debug;
use std::sync::{Arc, Mutex};

use crate::host::ProgressIndicator;

/// Loader state wrapped around the raw host spinner
pub struct LoadingIndicator {
    indicator: Arc<dyn ProgressIndicator>,
    busy: Mutex<bool>,
}

impl LoadingIndicator {
    /// Create an idle loader; the spinner is not touched until `begin`
    pub fn new(indicator: Arc<dyn ProgressIndicator>) -> Self {
        Self {
            indicator,
            busy: Mutex::new(false),
        }
    }

    /// Enter the busy state
    pub fn begin(&self) {
        let mut busy = self.busy.lock().unwrap();
        if *busy {
            return;
        }
        *busy = true;
        debug!("Frame loader: busy");
        self.indicator.show();
    }

    /// Leave the busy state
    pub fn end(&self) {
        let mut busy = self.busy.lock().unwrap();
        if !*busy {
            return;
        }
        *busy = false;
        debug!("Frame loader: idle");
        self.indicator.hide();
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.lock().unwrap()
    }
}
