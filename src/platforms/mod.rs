// src/platforms/mod.rs

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
    Error(String),
}

/// Raw presence signal as the remote service reports it. Closed over the
/// signals the service documents, with `Other` carrying anything new the
/// service starts sending.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceSignal {
    Online,
    Offline { was_online: NaiveDateTime },
    Recently,
    Other(String),
}

/// Profile as returned by the remote service for one account.
#[derive(Debug, Clone)]
pub struct Profile {
    pub account_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub signal: PresenceSignal,
}

/// The authenticated remote session, as the engine sees it. Establishing
/// the session (interactive login) belongs to the deployment tooling; the
/// engine only observes connection state and can disconnect on shutdown.
///
/// Error contract: implementations report the service telling the caller to
/// back off as [`Error::RateLimited`] and service-side request rejections
/// as [`Error::Protocol`]; anything else is treated as transient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresencePlatform: Send + Sync {
    async fn batch_get_profiles(&self, account_ids: &[i64]) -> Result<Vec<Profile>, Error>;
    async fn get_profile(&self, account_id: i64) -> Result<Profile, Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
    async fn disconnect(&mut self) -> Result<(), Error>;
}

// Re-export submodules
pub mod telegram;
