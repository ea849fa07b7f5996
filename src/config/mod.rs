//! src/config/mod.rs
//!
//! JSON configuration file loading and validation. All values the engine
//! consumes come from here; missing or invalid values are fatal at startup.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub tracking: TrackingConfig,
    pub database: DatabaseConfig,
    pub rate_limiting: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the session gateway lives. The authenticated session itself is
/// established by the deployment tooling; the engine only talks to the
/// gateway and never sees the account credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub gateway_url: String,
    /// Bearer token for the gateway. Falls back to the
    /// `WATCHBOT_GATEWAY_TOKEN` environment variable when absent.
    #[serde(default)]
    pub gateway_token: Option<String>,
}

impl TelegramConfig {
    pub fn resolve_token(&self) -> Option<String> {
        self.gateway_token
            .clone()
            .or_else(|| env::var("WATCHBOT_GATEWAY_TOKEN").ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub account_ids: Vec<i64>,
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests_per_second: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            warn!("Configuration file {} not found, writing template", path.display());
            write_default_template(path)?;
            return Err(Error::Config(format!(
                "no configuration at {}; a template was written, fill it in and restart",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.telegram.gateway_url.trim().is_empty() {
            return Err(Error::Config("telegram.gateway_url is required".to_string()));
        }
        if self.tracking.account_ids.is_empty() {
            return Err(Error::Config("tracking.account_ids must not be empty".to_string()));
        }
        if self.tracking.check_interval_secs == 0 {
            return Err(Error::Config("tracking.check_interval_secs must be > 0".to_string()));
        }
        if self.rate_limiting.max_requests_per_second == 0 {
            return Err(Error::Config(
                "rate_limiting.max_requests_per_second must be > 0".to_string(),
            ));
        }
        if self.database.path.trim().is_empty() {
            return Err(Error::Config("database.path is required".to_string()));
        }
        Ok(())
    }
}

fn write_default_template(path: &Path) -> Result<(), Error> {
    let template = serde_json::json!({
        "telegram": {
            "gateway_url": "http://127.0.0.1:8787",
            "gateway_token": null
        },
        "tracking": {
            "account_ids": [12345, 67890],
            "check_interval_secs": 60
        },
        "database": {
            "path": "data/tracker.db"
        },
        "rate_limiting": {
            "max_requests_per_second": 25
        },
        "logging": {
            "level": "info"
        }
    });

    fs::write(path, serde_json::to_string_pretty(&template)?)?;
    Ok(())
}
