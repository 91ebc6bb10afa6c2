//! Configuration management.
//!
//! Loads settings from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default transport timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Deployment environment, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    /// Local development
    #[default]
    Dev,
    /// Staging
    Stg,
    /// Beta
    Beta,
    /// Production
    Prod,
}

impl AppEnv {
    /// Read `APP_ENV`, falling back to `Dev` when unset or unknown.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup("APP_ENV")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Diagnostic logging is off in production.
    #[must_use]
    pub const fn logging_enabled(self) -> bool {
        !matches!(self, Self::Prod)
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" => Ok(Self::Dev),
            "stg" | "staging" => Ok(Self::Stg),
            "beta" => Ok(Self::Beta),
            "prod" | "production" => Ok(Self::Prod),
            other => Err(format!("unknown APP_ENV: {other}")),
        }
    }
}

/// Settings for an API client.
///
/// `headers == None` means the headers have not been provided yet; an
/// empty map is a valid, provided set of headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL relative request URLs are joined to
    pub host: String,
    /// Common headers sent with every request
    pub headers: Option<BTreeMap<String, String>>,
    /// Default timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            headers: Some(BTreeMap::new()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    /// Create settings for `host` with no extra headers
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Load settings from environment variables.
    ///
    /// - `API_HOST`: base URL (default: empty, i.e. not ready)
    /// - `API_HEADERS`: JSON object of common headers (default: `{}`;
    ///   unparseable values leave the headers unset)
    /// - `API_TIMEOUT_MS`: default timeout (default: 15000)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("API_HOST").unwrap_or_default(),
            headers: lookup("API_HEADERS")
                .map_or_else(|| Some(BTreeMap::new()), |raw| serde_json::from_str(&raw).ok()),
            timeout_ms: lookup("API_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Add a common header, providing the header map if it was unset
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the default timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        // Intentional truncation - timeouts beyond u64 milliseconds are not meaningful
        #[allow(clippy::cast_possible_truncation)]
        let millis = timeout.as_millis() as u64;
        self.timeout_ms = millis;
        self
    }

    /// Default timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// A client can be built once a host and headers are both present.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.host.trim().is_empty() && self.headers.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_app_env_parsing() {
        assert_eq!("prod".parse::<AppEnv>(), Ok(AppEnv::Prod));
        assert_eq!("Staging".parse::<AppEnv>(), Ok(AppEnv::Stg));
        assert!("qa".parse::<AppEnv>().is_err());
        assert!(!AppEnv::Prod.logging_enabled());
        assert!(AppEnv::Beta.logging_enabled());
    }

    #[test]
    fn test_default_config_is_not_ready() {
        let config = ApiConfig::default();
        assert!(!config.is_ready());
        assert_eq!(config.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_readiness_requires_host_and_headers() {
        let config = ApiConfig::new("https://jsonplaceholder.typicode.com/");
        assert!(config.is_ready());

        let no_headers = ApiConfig {
            headers: None,
            ..config.clone()
        };
        assert!(!no_headers.is_ready());

        let restored = no_headers.with_header("x-api-key", "k");
        assert!(restored.is_ready());
        assert_eq!(restored.headers.map(|h| h.len()), Some(1));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_app_env_lookup_falls_back_to_dev() {
        assert_eq!(AppEnv::from_lookup(vars(&[])), AppEnv::Dev);
        assert_eq!(AppEnv::from_lookup(vars(&[("APP_ENV", "qa")])), AppEnv::Dev);
        assert_eq!(AppEnv::from_lookup(vars(&[("APP_ENV", "production")])), AppEnv::Prod);
    }

    #[test]
    fn test_config_lookup_defaults() {
        let config = ApiConfig::from_lookup(vars(&[]));
        assert_eq!(config, ApiConfig::default());
        assert!(!config.is_ready());
    }

    #[test]
    fn test_config_lookup_reads_all_vars() {
        let config = ApiConfig::from_lookup(vars(&[
            ("API_HOST", "https://api.example.com"),
            ("API_HEADERS", r#"{"x-api-key":"k"}"#),
            ("API_TIMEOUT_MS", "2500"),
        ]));

        assert!(config.is_ready());
        assert_eq!(config.host, "https://api.example.com");
        assert_eq!(
            config.headers.as_ref().and_then(|h| h.get("x-api-key")).map(String::as_str),
            Some("k")
        );
        assert_eq!(config.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_unparseable_headers_leave_config_unready() {
        let config = ApiConfig::from_lookup(vars(&[
            ("API_HOST", "https://api.example.com"),
            ("API_HEADERS", "not json"),
        ]));
        assert_eq!(config.headers, None);
        assert!(!config.is_ready());
    }

    #[test]
    fn test_bad_timeout_falls_back_to_default() {
        let config = ApiConfig::from_lookup(vars(&[("API_TIMEOUT_MS", "soon")]));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_with_timeout() {
        let config = ApiConfig::new("http://localhost").with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout_ms, 2000);
    }
}
