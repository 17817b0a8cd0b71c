//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `INVENTORY_*` environment variables and the matching
//! command-line flags. Everything is optional; accessors apply the defaults.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::ReconcilePolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a `host:port` socket address.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },
    /// Release builds refuse to start without a shared API key.
    #[error("INVENTORY_API_KEY must be set")]
    MissingApiKey,
}

/// Runtime settings for the inventory service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INVENTORY")]
pub struct InventorySettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Shared secret expected in `X-API-Key`.
    pub api_key: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Attempts per reconcile before reporting a conflict.
    pub reconcile_max_attempts: Option<u32>,
    /// Lock wait per attempt, in milliseconds.
    pub lock_timeout_ms: Option<u64>,
}

impl InventorySettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .trim()
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            })
    }

    /// Database URL with blank values treated as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Configured API key, wrapped so it is wiped once consumed.
    pub fn api_key(&self) -> Option<Zeroizing<String>> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()))
    }

    /// API key, or an error when a release build has none configured.
    pub fn require_api_key(&self) -> Result<Option<Zeroizing<String>>, SettingsError> {
        match self.api_key() {
            Some(key) => Ok(Some(key)),
            None if cfg!(debug_assertions) => Ok(None),
            None => Err(SettingsError::MissingApiKey),
        }
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Retry and lock bounds, clamped to safe ranges.
    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy::new(self.reconcile_max_attempts, self.lock_timeout_ms)
    }
}
