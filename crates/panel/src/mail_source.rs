//! Mail source adapter
//!
//! Reads the open mail item from the host and turns the host's callback-based
//! body retrieval into a single-shot future.

use chrono::SecondsFormat;
use futures::channel::oneshot;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::busy::BusyFlag;
use crate::error::{PanelError, Result};
use crate::host::{AsyncStatus, CoercionType, MailItem};
use crate::models::{AttachmentInfo, MailContext};

/// Adapter over the host mail item
pub struct MailSource {
    item: Arc<dyn MailItem>,
    body_in_flight: BusyFlag,
}

impl MailSource {
    pub fn new(item: Arc<dyn MailItem>) -> Self {
        Self {
            item,
            body_in_flight: BusyFlag::new(),
        }
    }

    /// Snapshot of the open item with address lists flattened
    pub fn context(&self) -> MailContext {
        let snapshot = self.item.snapshot();
        MailContext {
            item_id: snapshot.item_id,
            internet_message_id: snapshot.internet_message_id,
            from: snapshot.from,
            sender: snapshot.sender,
            to: snapshot.to.addresses(),
            cc: snapshot.cc.addresses(),
            subject: snapshot.subject,
            normalized_subject: snapshot.normalized_subject,
            created_at: snapshot.date_time_created,
            attachments: snapshot.attachments,
        }
    }

    /// Fetch the HTML body
    ///
    /// Resolves exactly once per call. Only one retrieval may be pending at a
    /// time; a second call made before the first completes fails with
    /// [`PanelError::BodyInFlight`] without reaching the host.
    pub async fn body(&self) -> Result<String> {
        let Some(_in_flight) = self.body_in_flight.try_acquire() else {
            warn!("Rejecting overlapping message body request");
            return Err(PanelError::BodyInFlight);
        };

        let (tx, rx) = oneshot::channel();
        self.item.get_body_async(
            CoercionType::Html,
            Box::new(move |result| {
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(result);
            }),
        );

        let result = rx.await.map_err(|_| PanelError::BodyDropped)?;
        match result.status {
            AsyncStatus::Succeeded => {
                let body = result.value.unwrap_or_default();
                debug!("Fetched message body ({} bytes)", body.len());
                Ok(body)
            }
            AsyncStatus::Failed => {
                let (name, message) = result
                    .error
                    .map(|e| (e.name, e.message))
                    .unwrap_or_else(|| ("UnknownError".to_string(), String::new()));
                Err(PanelError::BodyUnavailable { name, message })
            }
        }
    }

    /// EWS endpoint of the host mailbox
    pub fn ews_url(&self) -> Option<String> {
        self.item.ews_url()
    }

    /// Collect the import payload for the open item, body included
    pub async fn mail_details(&self) -> Result<MailDetails> {
        let context = self.context();
        let body = self.body().await?;
        Ok(MailDetails::new(&context, body))
    }
}

/// Payload of the mail import action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDetails {
    /// Host item id
    pub mail_id: String,
    pub mail_from: String,
    pub mail_sender: String,
    pub mail_to: Vec<String>,
    pub mail_cc: Vec<String>,
    pub mail_message_id: String,
    pub mail_subject: String,
    pub mail_normalized_subject: String,
    /// ISO-8601 with milliseconds, UTC
    pub mail_date_time_created: String,
    pub mail_attachments: Vec<AttachmentInfo>,
    pub mail_body: String,
}

impl MailDetails {
    pub fn new(context: &MailContext, body: String) -> Self {
        Self {
            mail_id: context.item_id.clone(),
            mail_from: context.from.email.clone(),
            mail_sender: context.sender.email.clone(),
            mail_to: context.to.clone(),
            mail_cc: context.cc.clone(),
            mail_message_id: context.internet_message_id.clone(),
            mail_subject: context.subject.clone(),
            mail_normalized_subject: context.normalized_subject.clone(),
            mail_date_time_created: context
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            mail_attachments: context.attachments.clone(),
            mail_body: body,
        }
    }

    /// Flatten into request parameters
    pub fn into_params(self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "mail details encoded as {} instead of an object",
                other
            ))),
        }
    }
}
