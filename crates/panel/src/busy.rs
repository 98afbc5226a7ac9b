//! Single-holder busy flag

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag held by at most one operation at a time
#[derive(Debug, Default)]
pub struct BusyFlag {
    held: AtomicBool,
}

/// Releases the flag on drop, including when a future is cancelled
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag, or `None` if another operation holds it
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        if self.held.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(BusyGuard { flag: self })
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.held.store(false, Ordering::SeqCst);
    }
}
