//! Configuration loading for the CRM panel
//!
//! Provides utilities for locating and reading configuration files from the
//! shared panel config directory (~/.config/crm-panel/).

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Name of the directory created under the platform config dir
const DIR_NAME: &str = "crm-panel";

/// Get the panel config directory (~/.config/crm-panel/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(DIR_NAME))
}

/// Get the path to a config file within the panel config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Load and parse a JSON config file from the panel config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Check if a config file exists in the panel config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Read an environment variable, treating empty values as unset
pub fn env_var(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

/// Drop values that are empty or whitespace only
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Save a value as pretty-printed JSON to an arbitrary path
pub fn save_json_file<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        url: String,
        retries: u32,
    }

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("crm-panel"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("panel.json");
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("crm-panel/panel.json"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(Some(" padded ".to_string())), Some(" padded ".to_string()));
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("  \t".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_env_var_unset() {
        assert_eq!(env_var("CRM_PANEL_VARIABLE_THAT_IS_NEVER_SET"), None);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        let sample = Sample {
            url: "https://crm.example.com/".to_string(),
            retries: 2,
        };

        save_json_file(&path, &sample).unwrap();
        let loaded: Sample = load_json_file(&path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Sample> = load_json_file(&dir.path().join("missing.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result: Result<Sample> = load_json_file(&path);
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }
}
