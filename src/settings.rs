use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{KitboardError, Result};
use crate::kpi::DEFAULT_BASE_CURRENCY;
use crate::pager::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: String,
    pub organisation_name: String,
    pub base_currency: String,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            organisation_name: String::new(),
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home_dir().join(".config").join("kitboard")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    home_dir().join("Documents").join("kitboard")
}

fn parse_settings(content: &str) -> Settings {
    match serde_json::from_str(content) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("ignoring unreadable settings file: {e}");
            Settings::default()
        }
    }
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        parse_settings(&content)
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| KitboardError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/kits".to_string(),
            organisation_name: "Cycle Aid".to_string(),
            base_currency: "EUR".to_string(),
            page_size: 25,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = parse_settings(&std::fs::read_to_string(&path).unwrap());
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.organisation_name.is_empty());
        assert_eq!(s.base_currency, "USD");
        assert_eq!(s.page_size, 10);
        assert!(s.data_dir.ends_with("kitboard"));
    }

    #[test]
    fn test_missing_fields_merge_with_defaults() {
        let s = parse_settings(r#"{"data_dir": "/tmp/kits", "page_size": 5}"#);
        assert_eq!(s.data_dir, "/tmp/kits");
        assert_eq!(s.page_size, 5);
        assert_eq!(s.base_currency, "USD");
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        assert_eq!(parse_settings("not json"), Settings::default());
    }

    #[test]
    fn test_shellexpand_keeps_plain_paths() {
        assert_eq!(shellexpand_path("/definitely/not/here"), "/definitely/not/here");
    }
}
