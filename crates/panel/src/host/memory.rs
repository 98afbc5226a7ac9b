//! In-memory host implementations
//!
//! Recording stand-ins for every host trait. They let the panel run without
//! a mail client or browser, and let tests inspect exactly what the panel
//! asked the host to do.

use anyhow::{Result, anyhow};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use super::types::{
    AddressField, AsyncResult, BodyCallback, CoercionType, CreateCallback, CreatedRecord,
    HostError, MailItemSnapshot, NotificationMessage, PickerParams, QuickCreateParams,
    SelectCallback,
};
use super::{Frame, MailItem, NotificationSurface, PageHost, ProgressIndicator};
use super::{QuickCreateSurface, RecordPicker};
use crate::connector::{ActionRequest, ActionResponse, Transport};
use crate::models::{EmailAddress, RecordId};

// ============================================================================
// Mail item
// ============================================================================

/// How [`StaticMailItem`] answers body requests
#[derive(Debug, Clone)]
enum BodyMode {
    Respond(AsyncResult<String>),
    /// Keep the callback until `resolve_pending` is called
    Hold,
    /// Drop the callback without invoking it
    Discard,
}

/// Mail item with a fixed snapshot and scripted body behavior
pub struct StaticMailItem {
    snapshot: MailItemSnapshot,
    ews_url: Option<String>,
    body: RwLock<BodyMode>,
    pending: Mutex<Vec<BodyCallback>>,
    body_requests: AtomicUsize,
}

impl StaticMailItem {
    pub fn new(snapshot: MailItemSnapshot) -> Self {
        Self {
            snapshot,
            ews_url: None,
            body: RwLock::new(BodyMode::Respond(AsyncResult::succeeded(String::new()))),
            pending: Mutex::new(Vec::new()),
            body_requests: AtomicUsize::new(0),
        }
    }

    /// Item from a single sender with one recipient and no attachments
    pub fn from_sender(name: &str, email: &str, subject: &str) -> Self {
        let from = EmailAddress::with_name(name, email);
        Self::new(MailItemSnapshot {
            item_id: "AAMkAGI2TG93AAA=".to_string(),
            internet_message_id: "<message-1@example.com>".to_string(),
            from: from.clone(),
            sender: from,
            to: AddressField::Many(vec![EmailAddress::new("me@example.com")]),
            cc: AddressField::default(),
            subject: subject.to_string(),
            normalized_subject: subject.to_string(),
            date_time_created: Utc::now(),
            attachments: Vec::new(),
        })
    }

    pub fn with_ews_url(mut self, url: impl Into<String>) -> Self {
        self.ews_url = Some(url.into());
        self
    }

    /// Answer body requests immediately with this HTML
    pub fn with_body(self, html: impl Into<String>) -> Self {
        *self.body.write().unwrap() = BodyMode::Respond(AsyncResult::succeeded(html.into()));
        self
    }

    /// Answer body requests immediately with a failed status
    pub fn with_body_failure(self, error: HostError) -> Self {
        *self.body.write().unwrap() = BodyMode::Respond(AsyncResult::failed(error));
        self
    }

    /// Hold body callbacks until [`StaticMailItem::resolve_pending`]
    pub fn holding_body(self) -> Self {
        *self.body.write().unwrap() = BodyMode::Hold;
        self
    }

    /// Drop body callbacks without answering
    pub fn dropping_body(self) -> Self {
        *self.body.write().unwrap() = BodyMode::Discard;
        self
    }

    /// Answer the oldest held body request; false if none is pending
    pub fn resolve_pending(&self, result: AsyncResult<String>) -> bool {
        let callback = {
            let mut pending = self.pending.lock().unwrap();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0)
        };
        callback(result);
        true
    }

    pub fn body_requests(&self) -> usize {
        self.body_requests.load(Ordering::SeqCst)
    }
}

impl MailItem for StaticMailItem {
    fn snapshot(&self) -> MailItemSnapshot {
        self.snapshot.clone()
    }

    fn get_body_async(&self, _coercion: CoercionType, callback: BodyCallback) {
        self.body_requests.fetch_add(1, Ordering::SeqCst);
        let mode = self.body.read().unwrap().clone();
        match mode {
            BodyMode::Respond(result) => callback(result),
            BodyMode::Hold => self.pending.lock().unwrap().push(callback),
            BodyMode::Discard => drop(callback),
        }
    }

    fn ews_url(&self) -> Option<String> {
        self.ews_url.clone()
    }
}

// ============================================================================
// Frame, spinner, page
// ============================================================================

/// Frame that records every location it was pointed at
#[derive(Default)]
pub struct RecordingFrame {
    history: RwLock<Vec<String>>,
}

impl RecordingFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read().unwrap().clone()
    }
}

impl Frame for RecordingFrame {
    fn set_location(&self, url: &str) {
        self.history.write().unwrap().push(url.to_string());
    }

    fn location(&self) -> Option<String> {
        self.history.read().unwrap().last().cloned()
    }
}

/// Spinner that counts show/hide calls
#[derive(Default)]
pub struct RecordingIndicator {
    visible: RwLock<bool>,
    shows: AtomicUsize,
    hides: AtomicUsize,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.read().unwrap()
    }

    pub fn show_count(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    pub fn hide_count(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }
}

impl ProgressIndicator for RecordingIndicator {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
        *self.visible.write().unwrap() = true;
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
        *self.visible.write().unwrap() = false;
    }
}

/// Page host counting reloads
#[derive(Default)]
pub struct RecordingPage {
    reloads: AtomicUsize,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl PageHost for RecordingPage {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Notification surface keeping the full message log
#[derive(Default)]
pub struct RecordingNotifications {
    log: RwLock<Vec<(String, NotificationMessage)>>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message currently displayed under `key`
    pub fn current(&self, key: &str) -> Option<NotificationMessage> {
        self.log
            .read()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m.clone())
    }

    /// Number of messages ever posted under `key`
    pub fn count(&self, key: &str) -> usize {
        self.log.read().unwrap().iter().filter(|(k, _)| k == key).count()
    }

    pub fn total(&self) -> usize {
        self.log.read().unwrap().len()
    }
}

impl NotificationSurface for RecordingNotifications {
    fn replace(&self, key: &str, message: NotificationMessage) {
        self.log.write().unwrap().push((key.to_string(), message));
    }
}

// ============================================================================
// Quick-create and record picker
// ============================================================================

/// One recorded quick-create invocation
#[derive(Debug, Clone, PartialEq)]
pub struct QuickCreateCall {
    pub module: String,
    pub data: Map<String, Value>,
    pub no_cache: bool,
    pub has_callback: bool,
}

/// Quick-create surface that records forms and lets tests "save" them
#[derive(Default)]
pub struct RecordingQuickCreate {
    calls: RwLock<Vec<QuickCreateCall>>,
    callbacks: Mutex<Vec<Option<CreateCallback>>>,
}

impl RecordingQuickCreate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<QuickCreateCall> {
        self.calls.read().unwrap().clone()
    }

    /// Simulate saving the form opened by call `index`
    ///
    /// Returns false if the call had no callback or was already completed.
    pub fn complete(&self, index: usize, record: CreatedRecord) -> bool {
        let callback = self
            .callbacks
            .lock()
            .unwrap()
            .get_mut(index)
            .and_then(Option::take);
        match callback {
            Some(callback) => {
                callback(record);
                true
            }
            None => false,
        }
    }
}

impl QuickCreateSurface for RecordingQuickCreate {
    fn create_record(&self, module: &str, params: QuickCreateParams) {
        self.calls.write().unwrap().push(QuickCreateCall {
            module: module.to_string(),
            data: params.data,
            no_cache: params.no_cache,
            has_callback: params.callback.is_some(),
        });
        self.callbacks.lock().unwrap().push(params.callback);
    }
}

/// Record picker that records requests and lets tests choose a record
#[derive(Default)]
pub struct RecordingPicker {
    requests: RwLock<Vec<PickerParams>>,
    pending: Mutex<Option<SelectCallback>>,
}

impl RecordingPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<PickerParams> {
        self.requests.read().unwrap().clone()
    }

    /// Choose a record in the most recently opened picker
    pub fn select(&self, id: RecordId) -> bool {
        let callback = self.pending.lock().unwrap().take();
        match callback {
            Some(callback) => {
                callback(id);
                true
            }
            None => false,
        }
    }
}

impl RecordPicker for RecordingPicker {
    fn show_records_list(&self, params: PickerParams, on_select: SelectCallback) {
        self.requests.write().unwrap().push(params);
        *self.pending.lock().unwrap() = Some(on_select);
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Transport replaying queued responses and recording requests
///
/// An empty queue behaves like an unreachable server.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<ActionResponse, String>>>,
    requests: RwLock<Vec<ActionRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ActionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Err(reason.into()));
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.read().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post(&self, request: &ActionRequest) -> Result<ActionResponse> {
        self.requests.write().unwrap().push(request.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Err(anyhow!("no scripted response")),
        }
    }
}
