use anyhow::{Context, Result};
use url::Url;

use crate::models::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the parser/deploy backend; its API lives under `/api`.
    pub backend_url: Url,
    pub port: u16,
    pub rust_log: String,
    /// Prefix for the shareable portfolio address shown after deploy.
    pub public_origin: Option<Url>,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped.
    pub session_idle_minutes: u32,
}

const DEFAULT_SESSION_IDLE_MINUTES: u32 = 60;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let backend_url = require(&lookup, "BACKEND_URL")?;
        let public_origin = lookup("PUBLIC_ORIGIN")
            .filter(|v| !v.trim().is_empty())
            .map(|v| Url::parse(&v).context("PUBLIC_ORIGIN must be an absolute URL"))
            .transpose()?;

        Ok(Config {
            backend_url: Url::parse(&backend_url).context("BACKEND_URL must be an absolute URL")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            public_origin,
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            session_idle_minutes: match lookup("SESSION_IDLE_MINUTES") {
                Some(raw) => raw
                    .parse::<u32>()
                    .ok()
                    .filter(|m| *m > 0)
                    .context("SESSION_IDLE_MINUTES must be a positive number of minutes")?,
                None => DEFAULT_SESSION_IDLE_MINUTES,
            },
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("BACKEND_URL", "http://localhost:8001")]).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:8001/");
        assert_eq!(config.port, 3000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.public_origin, None);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.session_idle_minutes, 60);
    }

    #[test]
    fn test_backend_url_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("BACKEND_URL"));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(config(&[("BACKEND_URL", "not a url")]).is_err());
        assert!(config(&[("BACKEND_URL", "http://b"), ("PORT", "http")]).is_err());
        assert!(config(&[("BACKEND_URL", "http://b"), ("MAX_UPLOAD_BYTES", "-1")]).is_err());
        assert!(config(&[("BACKEND_URL", "http://b"), ("SESSION_IDLE_MINUTES", "0")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BACKEND_URL", "http://b"),
            ("PORT", "8080"),
            ("PUBLIC_ORIGIN", "https://folio.example"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("SESSION_IDLE_MINUTES", "5"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.public_origin.unwrap().as_str(),
            "https://folio.example/"
        );
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.session_idle_minutes, 5);
    }
}
