//! Relation mutation orchestrator
//!
//! Coordinates relation add/delete between the CRM backend and the page.

use log::{info, warn};
use std::sync::Arc;

use crate::busy::BusyFlag;
use crate::connector::{ActionConnector, ActionRequest};
use crate::host::PageHost;
use crate::models::{MailId, RecordId, RelatedRecordEntry, RelationMutationRequest};
use crate::notify::Notifier;

/// What happened to a mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The relation changed and the page reload was triggered
    Applied,
    /// The request failed; the error has been shown and nothing changed
    Rejected,
    /// Another mutation was still in flight; nothing was sent
    Ignored,
}

/// Executes relation mutations
///
/// A mutation is performed in two steps:
/// 1. Send the request to the CRM (via the connector)
/// 2. On success, notify and reload the whole page
///
/// The panel is never patched in place. Reloading re-fetches the list and the
/// frame together, so they cannot disagree about which relations exist.
pub struct RelationOrchestrator {
    connector: Arc<ActionConnector>,
    notifier: Arc<Notifier>,
    page: Arc<dyn PageHost>,
    /// CRM module handling the integration actions
    module: String,
    in_flight: BusyFlag,
}

impl RelationOrchestrator {
    pub fn new(
        connector: Arc<ActionConnector>,
        notifier: Arc<Notifier>,
        page: Arc<dyn PageHost>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            notifier,
            page,
            module: module.into(),
            in_flight: BusyFlag::new(),
        }
    }

    /// Relate a record to the mail
    pub fn add_relation(&self, mail_id: MailId, record: RecordId, module: &str) -> MutationOutcome {
        self.mutate(RelationMutationRequest::add(mail_id, record, module))
    }

    /// Remove the relation between the mail and a listed record
    pub fn delete_relation(&self, mail_id: MailId, entry: &RelatedRecordEntry) -> MutationOutcome {
        self.mutate(RelationMutationRequest::delete(mail_id, entry))
    }

    /// Send a mutation and reconcile the page with the result
    pub fn mutate(&self, request: RelationMutationRequest) -> MutationOutcome {
        let Some(_in_flight) = self.in_flight.try_acquire() else {
            warn!(
                "Ignoring {} for {} {}: another relation change is in progress",
                request.mode.as_str(),
                request.record_module,
                request.record_id
            );
            return MutationOutcome::Ignored;
        };

        info!(
            "Sending {} for mail {} and {} {}",
            request.mode.as_str(),
            request.mail_id.get(),
            request.record_module,
            request.record_id
        );

        let response = self
            .connector
            .send(&ActionRequest::relation(&self.module, &request));

        if response.success {
            info!("{} succeeded, reloading panel", request.mode.as_str());
            let message = self
                .notifier
                .translator()
                .translate(request.mode.success_message_key());
            self.notifier.info(&message);
            self.page.reload();
            return MutationOutcome::Applied;
        }

        // Transport failures were already reported by the connector
        if !response.is_transport_failure() {
            warn!(
                "{} rejected by server: {}",
                request.mode.as_str(),
                response.failure_message().unwrap_or("no message")
            );
            self.notifier.error(response.failure_message().unwrap_or(""));
        }
        MutationOutcome::Rejected
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_held()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ActionResponse;
    use crate::host::MapTranslator;
    use crate::host::memory::{
        RecordingIndicator, RecordingNotifications, RecordingPage, ScriptedTransport,
    };
    use crate::loader::LoadingIndicator;
    use crate::notify::{ERROR_KEY, INFORMATION_KEY};
    use serde_json::json;

    struct Fixture {
        orchestrator: RelationOrchestrator,
        transport: Arc<ScriptedTransport>,
        notifications: Arc<RecordingNotifications>,
        page: Arc<RecordingPage>,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let notifications = Arc::new(RecordingNotifications::new());
        let page = Arc::new(RecordingPage::new());
        let notifier = Arc::new(Notifier::new(
            notifications.clone(),
            Arc::new(MapTranslator::english()),
        ));
        let loader = Arc::new(LoadingIndicator::new(Arc::new(RecordingIndicator::new())));
        let connector = Arc::new(ActionConnector::new(
            transport.clone(),
            loader,
            notifier.clone(),
        ));
        Fixture {
            orchestrator: RelationOrchestrator::new(connector, notifier, page.clone(), "MailIntegration"),
            transport,
            notifications,
            page,
        }
    }

    fn entry() -> RelatedRecordEntry {
        RelatedRecordEntry::new(9, "Leads", "index.php?module=Leads&view=Detail&record=9")
    }

    #[test]
    fn test_delete_success_reloads_once() {
        let f = fixture();
        f.transport.push_response(ActionResponse::ok());

        let outcome = f.orchestrator.delete_relation(MailId(31), &entry());

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(f.page.reload_count(), 1);
        assert_eq!(f.notifications.count(INFORMATION_KEY), 1);
        assert_eq!(f.notifications.count(ERROR_KEY), 0);
        assert_eq!(
            f.notifications.current(INFORMATION_KEY).unwrap().message,
            "Relation removed successfully"
        );

        let sent = &f.transport.requests()[0];
        assert_eq!(sent.get("mode"), Some(json!("deleteRelation")));
        assert_eq!(sent.get("mailId"), Some(json!(31)));
        assert_eq!(sent.get("record"), Some(json!(9)));
        assert_eq!(sent.get("recordModule"), Some(json!("Leads")));
    }

    #[test]
    fn test_add_success_message() {
        let f = fixture();
        f.transport.push_response(ActionResponse::ok());

        let outcome = f.orchestrator.add_relation(MailId(31), RecordId(5), "Contacts");

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(
            f.notifications.current(INFORMATION_KEY).unwrap().message,
            "Relation added successfully"
        );
        assert_eq!(f.transport.requests()[0].get("mode"), Some(json!("addRelation")));
    }

    #[test]
    fn test_server_rejection_shows_one_error() {
        let f = fixture();
        f.transport
            .push_response(ActionResponse::rejected(Some("Record is locked".to_string())));

        let outcome = f.orchestrator.delete_relation(MailId(31), &entry());

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(f.page.reload_count(), 0);
        assert_eq!(f.notifications.count(ERROR_KEY), 1);
        assert_eq!(f.notifications.count(INFORMATION_KEY), 0);
        assert_eq!(
            f.notifications.current(ERROR_KEY).unwrap().message,
            "Error Record is locked"
        );
    }

    #[test]
    fn test_transport_failure_shows_one_error() {
        let f = fixture();
        f.transport.push_failure("connection reset");

        let outcome = f.orchestrator.add_relation(MailId(31), RecordId(5), "Contacts");

        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(f.page.reload_count(), 0);
        assert_eq!(f.notifications.count(ERROR_KEY), 1);
        assert_eq!(f.notifications.current(ERROR_KEY).unwrap().message, "Error");
    }

    #[test]
    fn test_flag_released_after_each_mutation() {
        let f = fixture();
        f.transport.push_failure("timeout");
        f.transport.push_response(ActionResponse::ok());

        assert_eq!(
            f.orchestrator.add_relation(MailId(1), RecordId(5), "Contacts"),
            MutationOutcome::Rejected
        );
        assert!(!f.orchestrator.is_busy());
        assert_eq!(
            f.orchestrator.add_relation(MailId(1), RecordId(5), "Contacts"),
            MutationOutcome::Applied
        );
        assert_eq!(f.transport.requests().len(), 2);
    }

    /// Transport that fires a second mutation while the first is being sent
    struct ReentrantTransport {
        orchestrator: std::sync::OnceLock<std::sync::Weak<RelationOrchestrator>>,
        nested: std::sync::Mutex<Option<MutationOutcome>>,
    }

    impl crate::connector::Transport for ReentrantTransport {
        fn post(&self, _request: &ActionRequest) -> anyhow::Result<ActionResponse> {
            if let Some(orchestrator) = self.orchestrator.get().and_then(|w| w.upgrade()) {
                let outcome = orchestrator.add_relation(MailId(1), RecordId(6), "Contacts");
                *self.nested.lock().unwrap() = Some(outcome);
            }
            Ok(ActionResponse::ok())
        }
    }

    #[test]
    fn test_overlapping_mutation_is_ignored() {
        let transport = Arc::new(ReentrantTransport {
            orchestrator: std::sync::OnceLock::new(),
            nested: std::sync::Mutex::new(None),
        });
        let notifications = Arc::new(RecordingNotifications::new());
        let page = Arc::new(RecordingPage::new());
        let notifier = Arc::new(Notifier::new(
            notifications.clone(),
            Arc::new(MapTranslator::english()),
        ));
        let loader = Arc::new(LoadingIndicator::new(Arc::new(RecordingIndicator::new())));
        let connector = Arc::new(ActionConnector::new(transport.clone(), loader, notifier.clone()));
        let orchestrator = Arc::new(RelationOrchestrator::new(
            connector,
            notifier,
            page.clone(),
            "MailIntegration",
        ));
        let _ = transport.orchestrator.set(Arc::downgrade(&orchestrator));

        let outcome = orchestrator.add_relation(MailId(1), RecordId(5), "Contacts");

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(*transport.nested.lock().unwrap(), Some(MutationOutcome::Ignored));
        assert_eq!(page.reload_count(), 1);
        assert_eq!(notifications.count(INFORMATION_KEY), 1);
    }
}
