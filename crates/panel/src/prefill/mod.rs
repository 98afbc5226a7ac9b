//! Quick-create prefill
//!
//! Derives the initial form values for a new CRM record from the open mail:
//! common fields (sender email, body, already-related records) plus whatever
//! the module's rule in the [`PrefillRegistry`] adds.

mod registry;

pub use registry::{PrefillRegistry, PrefillRule, fill_person_name, split_display_name, subject_into};

use serde_json::{Map, Value};

use crate::models::{MailContext, RecordRef, RelatedRecordEntry};

/// Form data for one quick-create invocation
#[derive(Debug, Clone, PartialEq)]
pub struct QuickCreatePrefill {
    pub module: String,
    /// Module-specific fields from the registry
    pub fields: Map<String, Value>,
    pub sender_email: String,
    /// HTML body, copied into `description`
    pub body: String,
    /// Records already related to the mail
    pub related_records: Vec<RecordRef>,
}

impl QuickCreatePrefill {
    /// Compute the prefill for `module`
    ///
    /// The body must already be fetched; quick-create never opens a form with
    /// a missing description.
    pub fn compute(
        registry: &PrefillRegistry,
        context: &MailContext,
        module: &str,
        related: &[RelatedRecordEntry],
        body: String,
    ) -> Self {
        let mut fields = Map::new();
        registry.apply(module, context, &mut fields);
        Self {
            module: module.to_string(),
            fields,
            sender_email: context.sender_address().to_string(),
            body,
            related_records: related.iter().map(RelatedRecordEntry::record_ref).collect(),
        }
    }

    /// Flatten into the quick-create `data` bag
    pub fn into_data(self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("email".to_string(), Value::from(self.sender_email.as_str()));
        data.insert("email1".to_string(), Value::from(self.sender_email));
        data.insert("relationOperation".to_string(), Value::Bool(true));
        data.insert(
            "relatedRecords".to_string(),
            Value::Array(
                self.related_records
                    .into_iter()
                    .map(|r| {
                        let mut record = Map::new();
                        record.insert("module".to_string(), Value::from(r.module));
                        record.insert("id".to_string(), Value::from(r.id.get()));
                        Value::Object(record)
                    })
                    .collect(),
            ),
        );
        data.extend(self.fields);
        data.insert("description".to_string(), Value::from(self.body));
        data
    }
}
