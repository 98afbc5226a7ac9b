//! Remote action connector
//!
//! This module provides:
//! - Request/response envelopes for CRM module actions
//! - A blocking HTTP transport
//! - The connector that centralizes transport failure handling

pub mod api;
mod http;

pub use api::{ACTION_IMPORT, ACTION_MAIL, ActionRequest, ActionResponse, ResponseOrigin};
pub use http::{HttpTransport, form_pairs};

use anyhow::Result;
use log::{debug, error};
use std::sync::Arc;

use crate::loader::LoadingIndicator;
use crate::notify::Notifier;

/// Sends one action request and returns the parsed response envelope
///
/// An `Err` means the request could not complete (network, HTTP status,
/// unparseable body).
pub trait Transport: Send + Sync {
    fn post(&self, request: &ActionRequest) -> Result<ActionResponse>;
}

/// Issues CRM actions and absorbs transport failures
///
/// `send` never fails: a transport failure ends the frame loader, shows the
/// generic error notification and comes back as `success: false`, so callers
/// only handle what the server answered.
pub struct ActionConnector {
    transport: Arc<dyn Transport>,
    loader: Arc<LoadingIndicator>,
    notifier: Arc<Notifier>,
}

impl ActionConnector {
    pub fn new(
        transport: Arc<dyn Transport>,
        loader: Arc<LoadingIndicator>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            transport,
            loader,
            notifier,
        }
    }

    pub fn send(&self, request: &ActionRequest) -> ActionResponse {
        debug!("Sending {}/{} request", request.module(), request.action());

        match self.transport.post(request) {
            Ok(response) => response,
            Err(e) => {
                error!("{} request failed: {:#}", request.action(), e);
                self.loader.end();
                self.notifier.error("");
                ActionResponse::transport_failure()
            }
        }
    }
}
