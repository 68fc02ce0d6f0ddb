//! services/web/src/config.rs
//!
//! Defines the client host's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base URL of the emotion backend (users, admin, models, emotion).
    pub backend_url: String,
    /// Base URL of the communications API; may live on another host.
    pub communications_url: String,
    pub session_path: PathBuf,
    /// The browser origin allowed by CORS.
    pub allowed_origin: HeaderValue,
    pub log_level: Level,
}

fn parse_base_url(var: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/').to_string();
    reqwest::Url::parse(&trimmed)
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))?;
    Ok(trimmed)
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:5173".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let allowed_origin_str =
            var("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let allowed_origin = allowed_origin_str.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Backend Settings ---
        let backend_url = var("BACKEND_URL")
            .ok_or_else(|| ConfigError::MissingVar("BACKEND_URL".to_string()))
            .and_then(|url| parse_base_url("BACKEND_URL", url))?;
        let communications_url = match var("COMMUNICATIONS_URL") {
            Some(url) => parse_base_url("COMMUNICATIONS_URL", url)?,
            None => backend_url.clone(),
        };

        // --- Session Persistence ---
        let session_path = var("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.deep-purple/session.json"));

        Ok(Self {
            bind_address,
            backend_url,
            communications_url,
            session_path,
            allowed_origin,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_backend_is_set() {
        let config = config_from(&[("BACKEND_URL", "http://localhost:8080/")]).unwrap();

        assert_eq!(config.backend_url, "http://localhost:8080");
        assert_eq!(config.communications_url, "http://localhost:8080");
        assert_eq!(config.bind_address.port(), 5173);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.session_path, PathBuf::from("./.deep-purple/session.json"));
        assert_eq!(config.allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn backend_url_is_required() {
        assert!(matches!(config_from(&[]), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn invalid_values_are_reported() {
        let bad_level = config_from(&[("BACKEND_URL", "http://b"), ("RUST_LOG", "loud")]);
        assert!(matches!(bad_level, Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"));

        let bad_url = config_from(&[("BACKEND_URL", "not a url")]);
        assert!(matches!(bad_url, Err(ConfigError::InvalidValue(var, _)) if var == "BACKEND_URL"));
    }

    #[test]
    fn communications_may_use_another_host() {
        let config = config_from(&[
            ("BACKEND_URL", "http://localhost:8080"),
            ("COMMUNICATIONS_URL", "http://analysis.example.com/api"),
        ])
        .unwrap();
        assert_eq!(config.communications_url, "http://analysis.example.com/api");
    }
}
