//! Panel configuration
//!
//! Supports loading settings from (in order of priority):
//! 1. An explicit JSON file
//! 2. `panel.json` in the panel config directory
//! 3. Runtime environment variables (fallback)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

use crate::host::MapTranslator;

/// Config filename in the panel config directory
const CONFIG_FILE: &str = "panel.json";

/// Settings for talking to the CRM and labelling the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Base URL of the CRM installation
    pub crm_url: Url,
    /// CRM module serving the integration actions
    #[serde(default = "default_integration_module")]
    pub integration_module: String,
    /// Source module passed to the record picker
    #[serde(default = "default_source_module")]
    pub source_module: String,
    /// Extra parameters merged into import requests
    #[serde(default)]
    pub panel_params: Map<String, Value>,
    /// Translation overrides (key → text)
    ///
    /// Applied by the panel on top of the host translator.
    #[serde(default)]
    pub translations: HashMap<String, String>,
    /// Icon id attached to informational notifications
    #[serde(default)]
    pub notification_icon: Option<String>,
}

fn default_integration_module() -> String {
    "MailIntegration".to_string()
}

fn default_source_module() -> String {
    "OSSMailView".to_string()
}

impl PanelConfig {
    /// Config with defaults for everything but the CRM URL
    pub fn new(crm_url: Url) -> Self {
        Self {
            crm_url,
            integration_module: default_integration_module(),
            source_module: default_source_module(),
            panel_params: Map::new(),
            translations: HashMap::new(),
            notification_icon: None,
        }
    }

    /// Load config from the config directory, falling back to the environment
    pub fn load() -> Result<Self> {
        if config::config_exists(CONFIG_FILE) {
            return config::load_json(CONFIG_FILE);
        }
        Self::from_env()
    }

    /// Load config from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        config::load_json_file(path)
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse panel config JSON")
    }

    /// Load config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(config::env_var)
    }

    /// Load config from variables resolved by `lookup`
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| config::non_blank(lookup(key));

        let url = var("CRM_PANEL_URL").context("CRM_PANEL_URL environment variable not set")?;
        let crm_url = Url::parse(&url).with_context(|| format!("Invalid CRM_PANEL_URL: {}", url))?;

        let mut config = Self::new(crm_url);
        if let Some(module) = var("CRM_PANEL_MODULE") {
            config.integration_module = module;
        }
        if let Some(module) = var("CRM_PANEL_SOURCE_MODULE") {
            config.source_module = module;
        }
        Ok(config)
    }

    /// CRM entry point receiving action requests
    pub fn endpoint(&self) -> Result<Url> {
        self.crm_url
            .join("index.php")
            .with_context(|| format!("Invalid CRM URL: {}", self.crm_url))
    }

    /// Built-in strings overlaid with the configured translations
    pub fn translator(&self) -> MapTranslator {
        MapTranslator::english().extend(self.translations.clone())
    }
}
