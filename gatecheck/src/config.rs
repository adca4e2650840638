//! Configuration management for the gate-check engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::validation::{ValidationConfig, DEFAULT_MAX_PAGES};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "gatecheck=info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ticket store connection
    pub store: StoreConfig,
    /// Validation settings
    pub gate: GateConfig,
    /// Log filter directive (`RUST_LOG`, default `gatecheck=info`)
    pub log_level: String,
}

/// Ticket store (AppSync) configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// GraphQL endpoint URL
    pub api_url: String,
    /// API key sent as `x-api-key`
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Validation configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GateConfig {
    /// Page cap for paginated lookups (default: 50)
    pub max_pages: usize,
    /// Reject tickets with no validity flag (default: false)
    pub require_explicit_validity: bool,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            store: StoreConfig {
                api_url: var("TICKET_APPSYNC_API_URL").unwrap_or_default(),
                api_key: var("TICKET_APPSYNC_API_KEY").unwrap_or_default(),
                timeout_secs: var("TICKET_STORE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            gate: GateConfig {
                max_pages: var("GATECHECK_MAX_PAGES")
                    .and_then(|s| s.parse().ok())
                    .filter(|pages| *pages > 0)
                    .unwrap_or(DEFAULT_MAX_PAGES),
                require_explicit_validity: var("GATECHECK_REQUIRE_EXPLICIT_VALIDITY")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
            log_level: var("RUST_LOG")
                .filter(|directive| !directive.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Engine settings derived from this configuration
    #[must_use]
    pub const fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_pages: self.gate.max_pages,
            require_explicit_validity: self.gate.require_explicit_validity,
        }
    }
}
