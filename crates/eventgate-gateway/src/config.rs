//! Gateway configuration types.
//!
//! Configuration is read from environment variables at startup. Every
//! setting has a default except the upstream URLs, which are optional.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use eventgate_core::{CoreError, OriginPolicy};
use eventgate_upstream::UpstreamConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// The environment variable.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// An entry of `CORS_ORIGINS` is not a valid origin.
    #[error("invalid CORS_ORIGINS entry: {0}")]
    InvalidOrigin(#[from] CoreError),
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins. A `*` entry allows every origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// How long in-flight requests may run after shutdown is requested.
    #[serde(default = "GatewayConfig::default_drain_timeout")]
    pub drain_timeout_seconds: u64,

    /// Login and events collaborators.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_drain_timeout() -> u64 {
        10
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Recognized variables: `LISTEN_ADDR`, `CORS_ORIGINS` (comma separated),
    /// `MAX_BODY_BYTES`, `REQUEST_TIMEOUT_SECONDS`, `DRAIN_TIMEOUT_SECONDS`,
    /// `LOGIN_UPSTREAM_URL`, `EVENTS_UPSTREAM_URL`, `UPSTREAM_TIMEOUT_SECONDS`.
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value or
    /// `CORS_ORIGINS` contains an invalid origin.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        let config = Self {
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(Self::default_listen_addr),
            cors_origins,
            max_body_bytes: parse_or(
                get("MAX_BODY_BYTES"),
                "MAX_BODY_BYTES",
                Self::default_max_body(),
            )?,
            request_timeout_seconds: parse_or(
                get("REQUEST_TIMEOUT_SECONDS"),
                "REQUEST_TIMEOUT_SECONDS",
                Self::default_request_timeout(),
            )?,
            drain_timeout_seconds: parse_or(
                get("DRAIN_TIMEOUT_SECONDS"),
                "DRAIN_TIMEOUT_SECONDS",
                Self::default_drain_timeout(),
            )?,
            upstream: UpstreamConfig {
                login_url: get("LOGIN_UPSTREAM_URL"),
                events_url: get("EVENTS_UPSTREAM_URL"),
                timeout_seconds: parse_or(
                    get("UPSTREAM_TIMEOUT_SECONDS"),
                    "UPSTREAM_TIMEOUT_SECONDS",
                    UpstreamConfig::default().timeout_seconds,
                )?,
            },
        };

        config.origin_policy()?;
        Ok(config)
    }

    /// Build the cross-origin policy from `cors_origins`.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not a valid origin.
    pub fn origin_policy(&self) -> Result<OriginPolicy, ConfigError> {
        Ok(OriginPolicy::from_list(&self.cors_origins)?)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the drain timeout as a `Duration`.
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_seconds)
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: Vec::new(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            drain_timeout_seconds: Self::default_drain_timeout(),
            upstream: UpstreamConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert!(config.upstream.login_url.is_none());
    }

    #[test]
    fn default_policy_is_restrictive() {
        let policy = GatewayConfig::default().origin_policy().unwrap();
        assert_eq!(policy, OriginPolicy::default());
    }

    #[test]
    fn timeout_duration() {
        let config = GatewayConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.drain_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.upstream.timeout_seconds, 30);
    }

    #[test]
    fn environment_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("CORS_ORIGINS", "https://app.example.com, http://localhost:3000"),
            ("MAX_BODY_BYTES", "2048"),
            ("REQUEST_TIMEOUT_SECONDS", "5"),
            ("DRAIN_TIMEOUT_SECONDS", "2"),
            ("LOGIN_UPSTREAM_URL", "http://login.local/login"),
            ("EVENTS_UPSTREAM_URL", ""),
            ("UPSTREAM_TIMEOUT_SECONDS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(
            config.cors_origins,
            ["https://app.example.com", "http://localhost:3000"]
        );
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.drain_timeout(), Duration::from_secs(2));
        assert_eq!(
            config.upstream.login_url.as_deref(),
            Some("http://login.local/login")
        );
        assert!(config.upstream.events_url.is_none());
        assert_eq!(config.upstream.timeout_seconds, 7);

        let policy = config.origin_policy().unwrap();
        assert!(policy.allows("http://localhost:3000"));
        assert!(!policy.is_permissive());
    }

    #[test]
    fn wildcard_switch_enables_permissive_policy() {
        let config = GatewayConfig::from_lookup(lookup(&[("CORS_ORIGINS", "*")])).unwrap();
        assert!(config.origin_policy().unwrap().is_permissive());
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "MAX_BODY_BYTES", .. }
        ));
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let err =
            GatewayConfig::from_lookup(lookup(&[("CORS_ORIGINS", "https://ok.example, nope")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOrigin(_)));
    }
}
