//! List/selection panel
//!
//! Entry point for user gestures. Each gesture has exactly one effect:
//! selecting an entry, opening a link, deleting a relation, opening a
//! quick-create form, opening the record picker, or importing the mail.

use log::{error, info, warn};
use serde_json::Value;
use std::sync::{Arc, RwLock};

use crate::actions::{MutationOutcome, RelationOrchestrator};
use crate::config::PanelConfig;
use crate::connector::{ACTION_IMPORT, ActionConnector, ActionRequest, ActionResponse, Transport};
use crate::error::{PanelError, Result};
use crate::frame::FrameController;
use crate::host::{
    Frame, LayeredTranslator, MailItem, NotificationSurface, PageHost, PickerParams,
    ProgressIndicator, QuickCreateParams, QuickCreateSurface, RecordPicker, Translator,
};
use crate::loader::LoadingIndicator;
use crate::mail_source::MailSource;
use crate::models::{MailId, ModuleOption, RecordId, RelatedRecordEntry};
use crate::notify::Notifier;
use crate::prefill::{PrefillRegistry, QuickCreatePrefill};

/// Host collaborators the panel is wired to
#[derive(Clone)]
pub struct PanelHost {
    pub mail_item: Arc<dyn MailItem>,
    pub frame: Arc<dyn Frame>,
    pub progress: Arc<dyn ProgressIndicator>,
    pub notifications: Arc<dyn NotificationSurface>,
    pub page: Arc<dyn PageHost>,
    pub quick_create: Arc<dyn QuickCreateSurface>,
    pub picker: Arc<dyn RecordPicker>,
    pub translator: Arc<dyn Translator>,
    pub transport: Arc<dyn Transport>,
}

/// Data rendered into the panel by the CRM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelData {
    /// CRM id of the imported mail; `None` until the mail is imported
    pub mail_id: Option<MailId>,
    pub entries: Vec<RelatedRecordEntry>,
    /// Modules offered by the module picker, in display order
    pub modules: Vec<ModuleOption>,
}

/// Which gestures the panel offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// The mail exists in the CRM; relations can be managed
    Relations(MailId),
    /// The mail is unknown to the CRM; it can only be imported
    Import,
}

/// The panel core: gesture dispatch over the frame, orchestrator and host
pub struct PanelController {
    config: PanelConfig,
    mode: PanelMode,
    modules: Vec<ModuleOption>,
    selected_module: RwLock<Option<String>>,
    loader: Arc<LoadingIndicator>,
    notifier: Arc<Notifier>,
    connector: Arc<ActionConnector>,
    frame: Arc<FrameController>,
    orchestrator: Arc<RelationOrchestrator>,
    mail_source: MailSource,
    prefill: PrefillRegistry,
    quick_create: Arc<dyn QuickCreateSurface>,
    picker: Arc<dyn RecordPicker>,
}

impl PanelController {
    /// Wire the panel components together
    pub fn new(config: PanelConfig, host: PanelHost, data: PanelData) -> Self {
        let loader = Arc::new(LoadingIndicator::new(host.progress));
        let translator: Arc<dyn Translator> = if config.translations.is_empty() {
            host.translator
        } else {
            Arc::new(LayeredTranslator::new(config.translations.clone(), host.translator))
        };
        let mut notifier = Notifier::new(host.notifications, translator);
        if let Some(icon) = &config.notification_icon {
            notifier = notifier.with_icon(icon.clone());
        }
        let notifier = Arc::new(notifier);
        let connector = Arc::new(ActionConnector::new(
            host.transport,
            loader.clone(),
            notifier.clone(),
        ));
        let frame = Arc::new(
            FrameController::new(host.frame, loader.clone(), data.entries)
                .with_base_url(config.crm_url.clone()),
        );
        let orchestrator = Arc::new(RelationOrchestrator::new(
            connector.clone(),
            notifier.clone(),
            host.page,
            config.integration_module.clone(),
        ));
        let mode = match data.mail_id {
            Some(mail_id) => PanelMode::Relations(mail_id),
            None => PanelMode::Import,
        };
        let selected_module = data.modules.first().map(|m| m.name.clone());

        Self {
            config,
            mode,
            modules: data.modules,
            selected_module: RwLock::new(selected_module),
            loader,
            notifier,
            connector,
            frame,
            orchestrator,
            mail_source: MailSource::new(host.mail_item),
            prefill: PrefillRegistry::default(),
            quick_create: host.quick_create,
            picker: host.picker,
        }
    }

    /// Replace the module prefill rules
    pub fn with_prefill_registry(mut self, registry: PrefillRegistry) -> Self {
        self.prefill = registry;
        self
    }

    /// Show the first related record (or settle the loader if there is none)
    pub fn initialize(&self) {
        info!("Initializing panel in {:?} mode", self.mode);
        self.frame.initialize();
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    pub fn frame(&self) -> &FrameController {
        &self.frame
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_busy()
    }

    /// The embedded frame reported its load finished
    pub fn on_frame_loaded(&self) {
        self.frame.on_load_settled();
    }

    // === Gestures ===

    /// Click on a list entry
    pub fn select(&self, id: RecordId) -> Result<()> {
        self.frame.select_entry(id).map(|_| ())
    }

    /// Click on a link rendered inside the panel (e.g. in a popover)
    pub fn open_link(&self, url: &str) {
        self.frame.navigate(url);
    }

    /// Remove the relation between the mail and a listed record
    pub fn delete_relation(&self, id: RecordId) -> Result<MutationOutcome> {
        let mail_id = self.require_mail_id()?;
        let entry = self.frame.entry(id).ok_or(PanelError::UnknownEntry(id))?;
        Ok(self.orchestrator.delete_relation(mail_id, &entry))
    }

    /// Quick-create a `target_module` record from a list entry
    ///
    /// The new record is linked to the entry; once saved, the frame reloads.
    pub async fn quick_create_from_entry(&self, id: RecordId, target_module: &str) -> Result<()> {
        let entry = self.frame.entry(id).ok_or(PanelError::UnknownEntry(id))?;
        let frame = self.frame.clone();

        let mut params = QuickCreateParams::new().with_callback(move |created| {
            info!("Created record {}, refreshing frame", created.record_id);
            frame.refresh();
        });
        params.data.insert("sourceModule".to_string(), Value::from(entry.module.as_str()));
        params.data.insert("sourceRecord".to_string(), Value::from(entry.id.get()));

        self.show_quick_create(target_module, params).await
    }

    /// Choose a module in the module picker
    ///
    /// Returns whether the add-record button should be visible.
    pub fn select_module(&self, module: &str) -> bool {
        *self.selected_module.write().unwrap() = Some(module.to_string());
        self.add_record_visible()
    }

    pub fn selected_module(&self) -> Option<String> {
        self.selected_module.read().unwrap().clone()
    }

    /// Whether the selected module supports quick-create from the panel
    pub fn add_record_visible(&self) -> bool {
        let selected = self.selected_module.read().unwrap();
        selected.as_deref().is_some_and(|name| {
            self.modules
                .iter()
                .any(|m| m.name == name && m.add_record)
        })
    }

    /// Open the record picker for the selected module; the chosen record is related
    pub fn select_existing_record(&self) -> Result<()> {
        let mail_id = self.require_mail_id()?;
        let module = self.selected_module().ok_or(PanelError::NoModuleSelected)?;
        let params = PickerParams {
            module: module.clone(),
            src_module: self.config.source_module.clone(),
        };

        let orchestrator = self.orchestrator.clone();
        self.picker.show_records_list(
            params,
            Box::new(move |record| {
                orchestrator.add_relation(mail_id, record, &module);
            }),
        );
        Ok(())
    }

    /// Quick-create a record in the selected module and relate it once saved
    pub async fn add_record(&self) -> Result<()> {
        let mail_id = self.require_mail_id()?;
        let module = self.selected_module().ok_or(PanelError::NoModuleSelected)?;

        let orchestrator = self.orchestrator.clone();
        let related_module = module.clone();
        let params = QuickCreateParams::new().with_callback(move |created| {
            orchestrator.add_relation(mail_id, created.record_id, &related_module);
        });

        self.show_quick_create(&module, params).await
    }

    /// Import the open mail into the CRM
    ///
    /// Only available before the mail is known to the CRM.
    pub async fn import_mail(&self) -> Result<ActionResponse> {
        if let PanelMode::Relations(mail_id) = self.mode {
            warn!("Import requested for already imported mail {}", mail_id.get());
            return Err(PanelError::AlreadyImported(mail_id.get()));
        }

        let details = match self.mail_source.mail_details().await {
            Ok(details) => details,
            Err(e) => return Err(self.body_failed(e)),
        };

        let details = match details.into_params() {
            Ok(params) => params,
            Err(e) => {
                error!("Could not encode mail details: {}", e);
                self.notifier.error("");
                return Err(PanelError::InvalidPayload(e));
            }
        };

        let ews_url = self.mail_source.ews_url().map(Value::from).unwrap_or(Value::Null);
        let request = ActionRequest::new(self.config.integration_module.as_str(), ACTION_IMPORT)
            .param("ewsUrl", ews_url)
            .merge(details)
            .merge(self.config.panel_params.clone());

        info!("Importing mail {}", self.mail_source.context().item_id);
        let response = self.connector.send(&request);
        if response.success {
            info!("Mail import accepted");
        } else if !response.is_transport_failure() {
            // Transport failures were already reported by the connector
            warn!(
                "Mail import rejected: {}",
                response.failure_message().unwrap_or("no message")
            );
            self.notifier.error(response.failure_message().unwrap_or(""));
        }
        Ok(response)
    }

    // === Helpers ===

    fn require_mail_id(&self) -> Result<MailId> {
        match self.mode {
            PanelMode::Relations(mail_id) => Ok(mail_id),
            PanelMode::Import => {
                warn!("Relation gesture ignored: mail is not imported");
                Err(PanelError::NoMailId)
            }
        }
    }

    /// Open the quick-create form once the prefill (body included) is ready
    ///
    /// Caller-supplied data wins over prefilled fields.
    async fn show_quick_create(&self, module: &str, mut params: QuickCreateParams) -> Result<()> {
        let context = self.mail_source.context();
        let body = match self.mail_source.body().await {
            Ok(body) => body,
            Err(e) => return Err(self.body_failed(e)),
        };

        let prefill = QuickCreatePrefill::compute(
            &self.prefill,
            &context,
            module,
            &self.frame.entries(),
            body,
        );
        let mut data = prefill.into_data();
        data.extend(std::mem::take(&mut params.data));
        params.data = data;

        info!("Opening quick-create form for {}", module);
        self.quick_create.create_record(module, params);
        Ok(())
    }

    /// Report a body retrieval failure where it happened
    fn body_failed(&self, err: PanelError) -> PanelError {
        match &err {
            PanelError::BodyInFlight => {
                warn!("Gesture ignored: {}", err);
            }
            _ => {
                error!("Could not read message body: {}", err);
                self.loader.end();
                self.notifier.error("");
            }
        }
        err
    }
}
