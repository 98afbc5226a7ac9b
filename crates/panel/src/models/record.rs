//! Related CRM records shown in the list panel

use serde::{Deserialize, Serialize};
use std::fmt;

/// CRM record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (module, id) pair identifying a record across modules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub module: String,
    pub id: RecordId,
}

/// One row in the list panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedRecordEntry {
    pub id: RecordId,
    /// Owning CRM module (e.g., "Contacts")
    pub module: String,
    /// Navigation target inside the embedded CRM view
    pub url: String,
}

impl RelatedRecordEntry {
    pub fn new(id: u64, module: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            module: module.into(),
            url: url.into(),
        }
    }

    pub fn record_ref(&self) -> RecordRef {
        RecordRef {
            module: self.module.clone(),
            id: self.id,
        }
    }
}

/// An entry of the module picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOption {
    pub name: String,
    /// Whether records of this module can be quick-created from the panel
    pub add_record: bool,
}

impl ModuleOption {
    pub fn new(name: impl Into<String>, add_record: bool) -> Self {
        Self {
            name: name.into(),
            add_record,
        }
    }
}
