//! CRM action request/response envelopes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::RelationMutationRequest;

/// Action name used for relation add/delete
pub const ACTION_MAIL: &str = "Mail";
/// Action name used for importing the open mail
pub const ACTION_IMPORT: &str = "Import";

/// A request envelope addressed to one CRM module action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    module: String,
    action: String,
    params: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            params: Map::new(),
        }
    }

    /// Build the `Mail` action request for a relation mutation
    pub fn relation(module: impl Into<String>, request: &RelationMutationRequest) -> Self {
        Self::new(module, ACTION_MAIL)
            .param("mode", request.mode.as_str())
            .param("mailId", request.mail_id.get())
            .param("record", request.record_id.get())
            .param("recordModule", request.record_module.as_str())
    }

    /// Set a single parameter, replacing any previous value
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a parameter bag; later keys win
    pub fn merge(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Value of a parameter, including `module` and `action`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.to_params().remove(key)
    }

    /// Full parameter map as sent on the wire
    ///
    /// Merged parameters override `module` and `action` when they carry the
    /// same key.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("module".to_string(), Value::String(self.module.clone()));
        params.insert("action".to_string(), Value::String(self.action.clone()));
        params.extend(self.params.clone());
        params
    }
}

/// Where an [`ActionResponse`] came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseOrigin {
    /// Parsed from a server reply
    #[default]
    Server,
    /// Synthesized by the connector after the request could not complete
    Transport,
}

/// Error object some CRM actions return instead of `message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

/// Response envelope `{success, message?}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ResponseError>,
    #[serde(skip)]
    pub origin: ResponseOrigin,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            result: None,
            error: None,
            origin: ResponseOrigin::Server,
        }
    }

    /// Server-reported failure with an optional message
    pub fn rejected(message: Option<String>) -> Self {
        Self {
            success: false,
            message,
            ..Self::ok()
        }
    }

    /// Failure synthesized when the request never completed
    pub fn transport_failure() -> Self {
        Self {
            success: false,
            origin: ResponseOrigin::Transport,
            ..Self::ok()
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.origin == ResponseOrigin::Transport
    }

    /// Message to show for a failed response (`message`, then `error.message`)
    pub fn failure_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| self.error.as_ref().and_then(|e| e.message.as_deref()))
            .filter(|m| !m.is_empty())
    }
}
