//! Configuration loading and representation.
//!
//! Everything is read from `INVOICER_*` environment variables; unset variables
//! fall back to development defaults.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use invoicer_observability::LogFormat;

use crate::notifications::SimulatedProviderConfig;

pub const ENV_BIND_ADDR: &str = "INVOICER_BIND_ADDR";
pub const ENV_NOTIFICATION_DRIVER: &str = "INVOICER_NOTIFICATION_DRIVER";
pub const ENV_DELIVERY_DELAY_MS: &str = "INVOICER_DELIVERY_DELAY_MS";
pub const ENV_DELIVERY_DUPLICATES: &str = "INVOICER_DELIVERY_DUPLICATES";
pub const ENV_LOG_FORMAT: &str = "INVOICER_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Which notification driver backs the invoice service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDriverKind {
    Dummy,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub notification_driver: NotificationDriverKind,
    pub delivery_delay: Duration,
    pub delivery_duplicates: u32,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            notification_driver: NotificationDriverKind::Simulated,
            delivery_delay: Duration::from_millis(2000),
            delivery_duplicates: 1,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("INVOICER_"))
            .collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build from any key/value source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = raw
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_BIND_ADDR, format!("{e}")))?;
        }

        if let Some(raw) = lookup(ENV_NOTIFICATION_DRIVER) {
            config.notification_driver = match raw.trim().to_ascii_lowercase().as_str() {
                "dummy" => NotificationDriverKind::Dummy,
                "simulated" => NotificationDriverKind::Simulated,
                other => {
                    return Err(ConfigError::invalid(
                        ENV_NOTIFICATION_DRIVER,
                        format!("unknown driver {other:?} (expected dummy or simulated)"),
                    ));
                }
            };
        }

        if let Some(raw) = lookup(ENV_DELIVERY_DELAY_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_DELIVERY_DELAY_MS, format!("{e}")))?;
            config.delivery_delay = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ENV_DELIVERY_DUPLICATES) {
            let copies: u32 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_DELIVERY_DUPLICATES, format!("{e}")))?;
            if copies == 0 {
                return Err(ConfigError::invalid(
                    ENV_DELIVERY_DUPLICATES,
                    "must be at least 1",
                ));
            }
            config.delivery_duplicates = copies;
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw
                .parse()
                .map_err(|e: String| ConfigError::invalid(ENV_LOG_FORMAT, e))?;
        }

        Ok(config)
    }

    pub fn simulated_provider(&self) -> SimulatedProviderConfig {
        SimulatedProviderConfig::default()
            .with_delay(self.delivery_delay)
            .with_duplicates(self.delivery_duplicates)
    }
}
