// src/platforms/telegram/runtime.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::Error;
use crate::config::TelegramConfig;
use crate::platforms::{ConnectionStatus, PresencePlatform, PresenceSignal, Profile};
use crate::utils::time::from_epoch;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback when the service says "too many requests" without telling us
/// how long to wait.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Adapter over the local session gateway. The gateway owns the
/// authenticated session (established out-of-band by the deployment
/// tooling) and exposes profile lookups over plain HTTP.
pub struct TelegramPlatform {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    connection_status: ConnectionStatus,
}

#[derive(Debug, Deserialize)]
struct WireProfile {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    kind: String,
    was_online: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WireSession {
    authorized: bool,
}

#[derive(Debug, Deserialize)]
struct WireRetry {
    retry_after: Option<u64>,
}

impl TelegramPlatform {
    pub fn new(config: &TelegramConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            bearer_token: config.resolve_token(),
            connection_status: ConnectionStatus::Disconnected,
        })
    }

    /// Verifies the gateway holds an authorized session. The engine never
    /// performs the interactive login itself.
    pub async fn connect(&mut self) -> Result<(), Error> {
        let response = self.get("/api/session").send().await?;
        let session: WireSession = self.decode(response).await?;

        if !session.authorized {
            self.connection_status = ConnectionStatus::Error("session not authorized".to_string());
            return Err(Error::Platform(
                "gateway session is not authorized; run the deployment bootstrap".to_string(),
            ));
        }

        self.connection_status = ConnectionStatus::Connected;
        info!("Connected to session gateway at {}", self.base_url);
        Ok(())
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, Error> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .json::<WireRetry>()
                .await
                .ok()
                .and_then(|r| r.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(Error::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Protocol(format!("gateway returned {status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Protocol(format!("invalid gateway reply: {e}")))
    }
}

fn profile_from_wire(wire: WireProfile) -> Profile {
    Profile {
        account_id: wire.id,
        username: wire.username,
        first_name: wire.first_name,
        last_name: wire.last_name,
        signal: signal_from_wire(wire.status),
    }
}

fn signal_from_wire(status: Option<WireStatus>) -> PresenceSignal {
    let Some(status) = status else {
        return PresenceSignal::Other("empty".to_string());
    };

    match status.kind.as_str() {
        "online" => PresenceSignal::Online,
        "offline" => {
            // An offline signal without a decodable last-seen time is not
            // trusted; it falls through to the catch-all.
            match status.was_online.and_then(from_epoch) {
                Some(was_online) => PresenceSignal::Offline { was_online },
                None => PresenceSignal::Other(status.kind),
            }
        }
        "recently" => PresenceSignal::Recently,
        _ => {
            debug!("Unrecognized presence signal: {}", status.kind);
            PresenceSignal::Other(status.kind)
        }
    }
}

#[async_trait]
impl PresencePlatform for TelegramPlatform {
    async fn batch_get_profiles(&self, account_ids: &[i64]) -> Result<Vec<Profile>, Error> {
        let ids = account_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .get("/api/profiles")
            .query(&[("ids", ids.as_str())])
            .send()
            .await?;
        let profiles: Vec<WireProfile> = self.decode(response).await?;

        Ok(profiles.into_iter().map(profile_from_wire).collect())
    }

    async fn get_profile(&self, account_id: i64) -> Result<Profile, Error> {
        let response = self
            .get(&format!("/api/profiles/{account_id}"))
            .send()
            .await?;
        let profile: WireProfile = self.decode(response).await?;

        Ok(profile_from_wire(profile))
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        if self.connection_status != ConnectionStatus::Connected {
            return Ok(());
        }

        let mut request = self.http.post(format!("{}/api/disconnect", self.base_url));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let result = request.send().await;

        self.connection_status = ConnectionStatus::Disconnected;
        info!("Disconnected from session gateway");

        result.map(|_| ()).map_err(Error::Http)
    }
}
