//! Application state for the proxy server.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Client;

/// Proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,
    /// Base URL of the analytics backend, without a trailing slash.
    pub backend_url: String,
    /// Serve bundled mock dashboards to unauthenticated requests.
    pub static_export: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: ([127, 0, 0, 1], 3000).into(),
            backend_url: "http://127.0.0.1:8000".to_string(),
            static_export: false,
        }
    }
}

/// Invalid value in the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DATAPUUR_BIND address '{value}': {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("Invalid DATAPUUR_STATIC_EXPORT value '{0}' (expected true/false/1/0)")]
    InvalidFlag(String),
}

impl ProxyConfig {
    /// Set the backend URL.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_static_export(mut self, enabled: bool) -> Self {
        self.static_export = enabled;
        self
    }

    /// Defaults overridden by `DATAPUUR_BIND`, `DATAPUUR_BACKEND_URL` and
    /// `DATAPUUR_STATIC_EXPORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("DATAPUUR_BIND") {
            config.bind_address = bind
                .parse()
                .map_err(|source| ConfigError::InvalidBind {
                    value: bind.clone(),
                    source,
                })?;
        }
        if let Some(url) = lookup("DATAPUUR_BACKEND_URL") {
            config = config.with_backend_url(url);
        }
        if let Some(flag) = lookup("DATAPUUR_STATIC_EXPORT") {
            config.static_export = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "" | "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidFlag(flag)),
            };
        }

        Ok(config)
    }
}

/// Shared application state.
pub struct AppState {
    /// Proxy configuration.
    pub config: ProxyConfig,
    /// Client used for every backend hop.
    pub http: Client,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(ProxyConfig::default())
    }

    /// Create application state with custom configuration.
    pub fn with_config(config: ProxyConfig) -> Self {
        // Outbound calls carry no overall timeout, only a connect bound.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Full backend URL for `path`.
    pub fn backend_url(&self, path: &str) -> String {
        format!("{}{}", self.config.backend_url, path)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ProxyConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert!(!config.static_export);
    }

    #[test]
    fn test_env_overrides() {
        let config = ProxyConfig::from_lookup(env(&[
            ("DATAPUUR_BIND", "0.0.0.0:8080"),
            ("DATAPUUR_BACKEND_URL", "http://api:8000/"),
            ("DATAPUUR_STATIC_EXPORT", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.backend_url, "http://api:8000");
        assert!(config.static_export);
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(matches!(
            ProxyConfig::from_lookup(env(&[("DATAPUUR_BIND", "localhost")])),
            Err(ConfigError::InvalidBind { .. })
        ));
        assert!(matches!(
            ProxyConfig::from_lookup(env(&[("DATAPUUR_STATIC_EXPORT", "maybe")])),
            Err(ConfigError::InvalidFlag(_))
        ));
    }

    #[test]
    fn test_backend_url_join() {
        let state =
            AppState::with_config(ProxyConfig::default().with_backend_url("http://api:8000"));
        assert_eq!(
            state.backend_url("/api/processing-jobs"),
            "http://api:8000/api/processing-jobs"
        );
    }
}
