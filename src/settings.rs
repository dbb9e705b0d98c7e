use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::advisor::Advisor;
use crate::error::{CreditoError, Result};

/// Environment variable that overrides `api_base_url` for one run.
pub const API_URL_ENV: &str = "CREDITO_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// No timeout when unset: a hung backend keeps the screen loading.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub advisor: Advisor,
}

fn default_api_base_url() -> String {
    "http://localhost:4000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: None,
            advisor: Advisor::default(),
        }
    }
}

impl Settings {
    /// Base URL after applying the environment override, without a trailing slash.
    pub fn effective_api_url(&self) -> String {
        let url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone());
        url.trim().trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("credito")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("credito.log")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CreditoError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Checks that `url` looks like an http(s) base URL.
pub fn validate_api_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(CreditoError::Settings(format!(
            "API URL must start with http:// or https:// (got '{url}')"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_base_url: "http://192.168.68.117:4000".to_string(),
            request_timeout_secs: Some(15),
            advisor: Advisor {
                name: "Ana Ruiz".to_string(),
                role: "Gerente de crédito".to_string(),
                phone: "6141000000".to_string(),
            },
        };
        save_settings_to(&path, &settings).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.api_base_url, "http://192.168.68.117:4000");
        assert_eq!(loaded.request_timeout_secs, Some(15));
        assert_eq!(loaded.advisor.name, "Ana Ruiz");
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.api_base_url, "http://localhost:4000");
        assert!(s.request_timeout_secs.is_none());
        assert_eq!(s.advisor.name, "Juan Perez");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_base_url": "http://10.0.0.5:4000"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_base_url, "http://10.0.0.5:4000");
        assert_eq!(s.advisor.phone, "+526141088379");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let s = load_settings_from(&path);
        assert_eq!(s.api_base_url, "http://localhost:4000");
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&path, &Settings::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let s = Settings {
            request_timeout_secs: Some(0),
            ..Settings::default()
        };
        assert!(s.request_timeout().is_none());
        let s = Settings {
            request_timeout_secs: Some(5),
            ..Settings::default()
        };
        assert_eq!(s.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_validate_api_url() {
        assert_eq!(
            validate_api_url(" http://192.168.1.97:4000/ ").unwrap(),
            "http://192.168.1.97:4000"
        );
        assert!(validate_api_url("https://api.example.mx").is_ok());
        assert!(validate_api_url("192.168.1.97:4000").is_err());
        assert!(validate_api_url("http://").is_err());
    }
}
