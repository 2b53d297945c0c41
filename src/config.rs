// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once, at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `EV_API_BASE_URL` | Base URL of the portal REST API | `https://localhost:7217/api` |
//! | `EV_SESSION_DIR` | Directory holding the persisted session | `.ev-portal` |
//! | `EV_HTTP_TIMEOUT_SECS` | Request timeout for API calls | `15` |
//! | `EV_ACCEPT_INVALID_CERTS` | Accept self-signed TLS certificates (local dev API) | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,ev_portal_session=debug` |

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

/// Environment variable name for the API base URL.
///
/// Every endpoint (`auth/login`, `users/me/profile`, ...) is joined onto it.
pub const API_BASE_URL_ENV: &str = "EV_API_BASE_URL";

/// Local development API, as served by the backend's launch profile.
pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7217/api";

/// Environment variable name for the session directory.
pub const SESSION_DIR_ENV: &str = "EV_SESSION_DIR";

pub const DEFAULT_SESSION_DIR: &str = ".ev-portal";

pub const HTTP_TIMEOUT_ENV: &str = "EV_HTTP_TIMEOUT_SECS";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Environment variable name for accepting invalid TLS certificates.
///
/// Only meant for the self-signed development certificate.
pub const ACCEPT_INVALID_CERTS_ENV: &str = "EV_ACCEPT_INVALID_CERTS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,ev_portal_session=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Portal client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// API base, always ending in `/`
    pub api_base_url: Url,
    pub session_dir: PathBuf,
    pub http_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl PortalConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_base = get(API_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self {
            api_base_url: normalize_base(&raw_base).map_err(|e| ConfigError::InvalidUrl {
                name: API_BASE_URL_ENV,
                reason: e,
            })?,
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            accept_invalid_certs: false,
        };

        if let Some(dir) = get(SESSION_DIR_ENV) {
            config.session_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(HTTP_TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: HTTP_TIMEOUT_ENV,
                    expected: "a positive number of seconds",
                    value: raw.clone(),
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(ACCEPT_INVALID_CERTS_ENV) {
            config.accept_invalid_certs = parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                name: ACCEPT_INVALID_CERTS_ENV,
                expected: "true or false",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// HTTP client shared by the auth service and the resource client.
    pub fn http_client(&self) -> Result<Client, ConfigError> {
        Client::builder()
            .timeout(self.http_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

/// Parse a base URL and make sure its path ends in `/`.
fn normalize_base(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://localhost:7217/api/");
        assert_eq!(config.session_dir, PathBuf::from(".ev-portal"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn overrides() {
        let config = PortalConfig::from_lookup(lookup(&[
            (API_BASE_URL_ENV, "http://api.internal:8080/v2"),
            (SESSION_DIR_ENV, "/tmp/portal"),
            (HTTP_TIMEOUT_ENV, "3"),
            (ACCEPT_INVALID_CERTS_ENV, "yes"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://api.internal:8080/v2/");
        assert_eq!(config.session_dir, PathBuf::from("/tmp/portal"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = PortalConfig::from_lookup(lookup(&[(API_BASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(config, PortalConfig::from_lookup(lookup(&[])).unwrap());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err =
            PortalConfig::from_lookup(lookup(&[(API_BASE_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: API_BASE_URL_ENV, .. }));

        let err =
            PortalConfig::from_lookup(lookup(&[(API_BASE_URL_ENV, "ftp://host/api")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = PortalConfig::from_lookup(lookup(&[(HTTP_TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: HTTP_TIMEOUT_ENV, .. }));

        let err =
            PortalConfig::from_lookup(lookup(&[(ACCEPT_INVALID_CERTS_ENV, "maybe")])).unwrap_err();
        assert!(err.to_string().contains("true or false"));
    }

    #[test]
    fn http_client_builds() {
        let config = PortalConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.http_client().is_ok());
    }
}
