//! Service configuration for the Loyalteez API clients.
//!
//! Provides centralized configuration for the four Loyalteez service
//! families, the default brand id and the request timeout. Configuration is
//! loaded once from environment variables with the selected network's
//! production URLs as defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Loyalteez deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    fn tld(&self) -> &'static str {
        match self {
            Network::Mainnet => "app",
            Network::Testnet => "xyz",
        }
    }

    /// Event handler base URL (`api.loyalteez.*`).
    pub fn event_handler_url(&self) -> String {
        format!("https://api.loyalteez.{}", self.tld())
    }

    /// Shared gamification services base URL (`services.loyalteez.*`).
    pub fn services_url(&self) -> String {
        format!("https://services.loyalteez.{}", self.tld())
    }

    /// Wallet pregeneration base URL (`register.loyalteez.*`).
    pub fn pregen_url(&self) -> String {
        format!("https://register.loyalteez.{}", self.tld())
    }

    /// Gas relayer base URL (`relayer.loyalteez.*`).
    pub fn relayer_url(&self) -> String {
        format!("https://relayer.loyalteez.{}", self.tld())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(ConfigError::InvalidValue {
                key: "LOYALTEEZ_NETWORK".to_string(),
                message: format!("expected 'mainnet' or 'testnet', got '{}'", other),
            }),
        }
    }
}

/// Service configuration for all Loyalteez services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Selected network.
    pub network: Network,

    /// Event handler API (`/loyalteez-api/*`).
    pub event_handler: ServiceEndpoint,

    /// Shared services API (streaks, leaderboards, perks, ...).
    pub services: ServiceEndpoint,

    /// Wallet pregeneration API.
    pub pregen: ServiceEndpoint,

    /// Gas relayer.
    pub relayer: ServiceEndpoint,

    /// Default brand id for calls that omit `brandId`. Validated per call.
    pub default_brand_id: Option<String>,

    /// Root of the markdown documentation tree.
    pub docs_path: Option<PathBuf>,

    /// Default request timeout in seconds.
    pub default_timeout_secs: u64,
}

impl Default for ServiceConfig {
    /// Mainnet configuration without a default brand.
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl ServiceConfig {
    /// Configuration pointing every family at `network`'s production URLs.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            event_handler: ServiceEndpoint::new(network.event_handler_url()),
            services: ServiceEndpoint::new(network.services_url()),
            pregen: ServiceEndpoint::new(network.pregen_url()),
            relayer: ServiceEndpoint::new(network.relayer_url()),
            default_brand_id: None,
            docs_path: None,
            default_timeout_secs: 30,
        }
    }

    /// Configuration pointing every family at one base URL (tests, local stacks).
    pub fn single_host(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            event_handler: ServiceEndpoint::new(base_url.clone()),
            services: ServiceEndpoint::new(base_url.clone()),
            pregen: ServiceEndpoint::new(base_url.clone()),
            relayer: ServiceEndpoint::new(base_url),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOYALTEEZ_NETWORK`: `mainnet` (default) or `testnet`
    /// - `LOYALTEEZ_BRAND_ID`: default brand id
    /// - `LOYALTEEZ_EVENT_HANDLER_URL`: event handler URL override
    /// - `LOYALTEEZ_SERVICES_URL`: shared services URL override
    /// - `LOYALTEEZ_PREGEN_URL`: pregeneration URL override
    /// - `LOYALTEEZ_RELAYER_URL`: gas relayer URL override
    /// - `LOYALTEEZ_DOCS_PATH`: documentation root
    /// - `LOYALTEEZ_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match get("LOYALTEEZ_NETWORK") {
            Some(value) => value.parse()?,
            None => Network::default(),
        };
        let default = Self::for_network(network);

        let default_timeout_secs = match get("LOYALTEEZ_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "LOYALTEEZ_TIMEOUT_SECS".to_string(),
                    message: format!("expected a positive number of seconds, got '{}'", value),
                })?,
            None => default.default_timeout_secs,
        };

        Ok(Self {
            network,
            event_handler: get("LOYALTEEZ_EVENT_HANDLER_URL")
                .map(ServiceEndpoint::new)
                .unwrap_or(default.event_handler),
            services: get("LOYALTEEZ_SERVICES_URL")
                .map(ServiceEndpoint::new)
                .unwrap_or(default.services),
            pregen: get("LOYALTEEZ_PREGEN_URL")
                .map(ServiceEndpoint::new)
                .unwrap_or(default.pregen),
            relayer: get("LOYALTEEZ_RELAYER_URL")
                .map(ServiceEndpoint::new)
                .unwrap_or(default.relayer),
            default_brand_id: get("LOYALTEEZ_BRAND_ID"),
            docs_path: get("LOYALTEEZ_DOCS_PATH").map(PathBuf::from),
            default_timeout_secs,
        })
    }

    /// Switch network, moving every endpoint that still uses the old
    /// network's default URL.
    pub fn with_network(mut self, network: Network) -> Self {
        let old = Self::for_network(self.network);
        let new = Self::for_network(network);
        for (endpoint, old, new) in [
            (&mut self.event_handler, old.event_handler, new.event_handler),
            (&mut self.services, old.services, new.services),
            (&mut self.pregen, old.pregen, new.pregen),
            (&mut self.relayer, old.relayer, new.relayer),
        ] {
            if endpoint.base_url == old.base_url {
                *endpoint = new;
            }
        }
        self.network = network;
        self
    }

    /// Get the default request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

/// Configuration for a single service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL for the service (e.g., "https://api.loyalteez.app").
    pub base_url: String,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.default_timeout_secs, 30);
        assert_eq!(config.event_handler.base_url, "https://api.loyalteez.app");
        assert_eq!(config.services.base_url, "https://services.loyalteez.app");
        assert_eq!(config.pregen.base_url, "https://register.loyalteez.app");
        assert_eq!(config.relayer.base_url, "https://relayer.loyalteez.app");
        assert!(config.default_brand_id.is_none());
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.event_handler.base_url, "https://api.loyalteez.app");
        assert!(config.default_brand_id.is_none());
        assert!(config.docs_path.is_none());
    }

    #[test]
    fn test_testnet_urls() {
        let config = ServiceConfig::from_lookup(lookup(&[("LOYALTEEZ_NETWORK", "testnet")])).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.event_handler.base_url, "https://api.loyalteez.xyz");
        assert_eq!(config.services.base_url, "https://services.loyalteez.xyz");
        assert_eq!(config.pregen.base_url, "https://register.loyalteez.xyz");
        assert_eq!(config.relayer.base_url, "https://relayer.loyalteez.xyz");
    }

    #[test]
    fn test_invalid_network() {
        let err = ServiceConfig::from_lookup(lookup(&[("LOYALTEEZ_NETWORK", "devnet")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "LOYALTEEZ_NETWORK"));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("LOYALTEEZ_SERVICES_URL", "http://localhost:8787"),
            ("LOYALTEEZ_BRAND_ID", "0xABC"),
            ("LOYALTEEZ_DOCS_PATH", "/srv/docs"),
            ("LOYALTEEZ_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.services.base_url, "http://localhost:8787");
        assert_eq!(config.event_handler.base_url, "https://api.loyalteez.app");
        // Validated lazily by the brand id resolver.
        assert_eq!(config.default_brand_id.as_deref(), Some("0xABC"));
        assert_eq!(config.docs_path, Some(PathBuf::from("/srv/docs")));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(ServiceConfig::from_lookup(lookup(&[("LOYALTEEZ_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup(&[("LOYALTEEZ_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn test_with_network_keeps_overrides() {
        let mut config = ServiceConfig::default();
        config.services = ServiceEndpoint::new("http://localhost:8787");
        let config = config.with_network(Network::Testnet);
        assert_eq!(config.event_handler.base_url, "https://api.loyalteez.xyz");
        assert_eq!(config.services.base_url, "http://localhost:8787");
    }

    #[test]
    fn test_service_endpoint_url() {
        let endpoint = ServiceEndpoint::new("https://api.example.com");
        assert_eq!(
            endpoint.url("/loyalteez-api/health"),
            "https://api.example.com/loyalteez-api/health"
        );
        assert_eq!(
            endpoint.url("loyalteez-api/health"),
            "https://api.example.com/loyalteez-api/health"
        );
    }

    #[test]
    fn test_service_endpoint_url_trailing_slash() {
        let endpoint = ServiceEndpoint::new("https://api.example.com/");
        assert_eq!(endpoint.url("/relay"), "https://api.example.com/relay");
    }
}
