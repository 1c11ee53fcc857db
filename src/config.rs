//! Application settings.
//!
//! `Settings` is built once at startup (environment plus an optional
//! `.env` file) and shared read-only behind an `Arc`.

use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Method.AI";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version string reported in every generate response.
pub const API_VERSION: &str = "0.1.0";

pub const DEFAULT_RXN_BASE_URL: &str = "https://rxn.app.accelerate.science";
pub const DEFAULT_FEEDBACK_PATH: &str = "data/feedback/feedback.jsonl";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rxn_api_key: Option<String>,
    pub rxn_project_id: Option<String>,
    pub rxn_base_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub debug: bool,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub feedback_storage_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rxn_api_key: None,
            rxn_project_id: None,
            rxn_base_url: DEFAULT_RXN_BASE_URL.to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            debug: false,
            log_level: "info".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            feedback_storage_path: PathBuf::from(DEFAULT_FEEDBACK_PATH),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let api_port = match get("API_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "API_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.api_port,
        };

        let debug = match get("DEBUG") {
            Some(raw) => parse_bool("DEBUG", &raw)?,
            None => defaults.debug,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => parse_list("CORS_ORIGINS", &raw)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            rxn_api_key: get("RXN_API_KEY"),
            rxn_project_id: get("RXN_PROJECT_ID"),
            rxn_base_url: get("RXN_BASE_URL").unwrap_or(defaults.rxn_base_url),
            api_host: get("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            debug,
            log_level: get("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
            cors_origins,
            feedback_storage_path: get("FEEDBACK_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.feedback_storage_path),
        })
    }

    pub fn rxn_configured(&self) -> bool {
        self.rxn_api_key.is_some()
    }

    /// `tracing` filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> String {
        let level = if self.debug { "debug" } else { self.log_level.as_str() };
        format!("method_ai={level},tower_http={level},hyper=warn,reqwest=warn")
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Comma-separated values or a JSON array of strings.
fn parse_list(key: &'static str, raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(raw).map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        });
    }
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.rxn_configured());
    }

    #[test]
    fn reads_all_recognized_keys() {
        let settings = Settings::from_lookup(lookup(&[
            ("RXN_API_KEY", "secret"),
            ("RXN_PROJECT_ID", "proj-1"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("DEBUG", "true"),
            ("LOG_LEVEL", "WARN"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("FEEDBACK_STORAGE_PATH", "/tmp/fb.jsonl"),
        ]))
        .unwrap();

        assert_eq!(settings.rxn_api_key.as_deref(), Some("secret"));
        assert_eq!(settings.rxn_project_id.as_deref(), Some("proj-1"));
        assert_eq!(settings.api_host, "127.0.0.1");
        assert_eq!(settings.api_port, 9000);
        assert!(settings.debug);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(
            settings.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(settings.feedback_storage_path, PathBuf::from("/tmp/fb.jsonl"));
        assert!(settings.rxn_configured());
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let settings = Settings::from_lookup(lookup(&[("RXN_API_KEY", "  ")])).unwrap();
        assert!(!settings.rxn_configured());
    }

    #[test]
    fn cors_origins_accepts_json_array() {
        let settings =
            Settings::from_lookup(lookup(&[("CORS_ORIGINS", r#"["http://x:1","http://y:2"]"#)]))
                .unwrap();
        assert_eq!(settings.cors_origins, vec!["http://x:1", "http://y:2"]);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("API_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "API_PORT", .. }));
    }

    #[test]
    fn bad_bool_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("DEBUG", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DEBUG", .. }));
    }

    #[test]
    fn debug_raises_log_filter() {
        let settings = Settings {
            debug: true,
            ..Settings::default()
        };
        assert!(settings.log_filter().starts_with("method_ai=debug"));
        assert!(Settings::default().log_filter().starts_with("method_ai=info"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
        assert_eq!(API_VERSION, APP_VERSION);
    }
}
