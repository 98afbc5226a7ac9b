//! Module-keyed prefill rules

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::MailContext;

/// Computes module-specific quick-create fields from the mail
pub type PrefillRule = Box<dyn Fn(&MailContext, &mut Map<String, Value>) + Send + Sync>;

/// Table of prefill rules keyed by CRM module name
///
/// Modules without a rule get only the common fields.
pub struct PrefillRegistry {
    rules: HashMap<String, PrefillRule>,
}

impl PrefillRegistry {
    /// A registry with no module rules
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register (or replace) the rule for a module
    pub fn register<F>(&mut self, module: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&MailContext, &mut Map<String, Value>) + Send + Sync + 'static,
    {
        self.rules.insert(module.into(), Box::new(rule));
        self
    }

    pub fn contains(&self, module: &str) -> bool {
        self.rules.contains_key(module)
    }

    /// Apply the rule for `module`, if any, to `data`
    pub fn apply(&self, module: &str, context: &MailContext, data: &mut Map<String, Value>) {
        if let Some(rule) = self.rules.get(module) {
            rule(context, data);
        }
    }
}

impl Default for PrefillRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("Leads", |ctx, data| {
                data.insert("company".to_string(), Value::from(ctx.sender_name()));
                fill_person_name(ctx, data);
            })
            .register("Contacts", fill_person_name)
            .register("Project", subject_into("projectname"))
            .register("HelpDesk", subject_into("ticket_title"))
            .register("Products", subject_into("productname"))
            .register("Services", subject_into("servicename"));
        registry
    }
}

/// Split a display name at the first space into (first, last)
///
/// "Jane Doe" → ("Jane", "Doe"), "Mary Ann Smith" → ("Mary", "Ann Smith"),
/// "Support" → ("Support", "").
pub fn split_display_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Fill `firstname`/`lastname` from the sender display name
pub fn fill_person_name(context: &MailContext, data: &mut Map<String, Value>) {
    let (first, last) = split_display_name(context.sender_name());
    data.insert("firstname".to_string(), Value::from(first));
    data.insert("lastname".to_string(), Value::from(last));
}

/// Rule copying the mail subject into `field`
pub fn subject_into(field: &'static str) -> impl Fn(&MailContext, &mut Map<String, Value>) + Send + Sync {
    move |context, data| {
        data.insert(field.to_string(), Value::from(context.subject.as_str()));
    }
}
