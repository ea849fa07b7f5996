// src/services/status_fetcher.rs

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::Error;
use crate::models::{PresenceStatus, TrackedAccount};
use crate::platforms::{ConnectionStatus, PresencePlatform, PresenceSignal, Profile};
use crate::services::rate_limiter::RateLimiter;
use crate::utils::time;

/// One normalized status reading for one account, ready to persist.
#[derive(Debug, Clone)]
pub struct ObservedStatus {
    pub account: TrackedAccount,
    pub status: PresenceStatus,
    pub was_online: Option<NaiveDateTime>,
    pub recorded_at: NaiveDateTime,
}

/// Fetches profiles for the tracked accounts, batch first, one-by-one when
/// the batch path degrades. Owns the platform handle and the rate limiter
/// for the engine's lifetime.
pub struct StatusFetcher<P: PresencePlatform> {
    platform: P,
    limiter: RateLimiter,
}

impl<P: PresencePlatform> StatusFetcher<P> {
    pub fn new(platform: P, limiter: RateLimiter) -> Self {
        Self { platform, limiter }
    }

    /// Fetches every account in `account_ids`. Failures never escape this
    /// boundary: the result is a partial (possibly empty) list and every
    /// error path leaves a diagnostic behind.
    pub async fn fetch_all(&mut self, account_ids: &[i64]) -> Vec<ObservedStatus> {
        if account_ids.is_empty() {
            return Vec::new();
        }

        self.limiter.acquire().await;
        debug!("Fetching {} accounts in batch", account_ids.len());

        match self.platform.batch_get_profiles(account_ids).await {
            Ok(profiles) => {
                info!("Batch fetch returned {} profiles", profiles.len());
                profiles.into_iter().map(normalize).collect()
            }
            Err(Error::RateLimited { retry_after_secs }) => {
                // The service told us to back off; the rest of this cycle is
                // abandoned and the next scheduled cycle starts fresh.
                warn!("Hit remote rate limit, waiting {retry_after_secs}s");
                sleep(Duration::from_secs(retry_after_secs)).await;
                Vec::new()
            }
            Err(Error::Protocol(e)) => {
                error!("Protocol error during batch fetch: {e}");
                Vec::new()
            }
            Err(e) => {
                error!("Batch fetch failed: {e}");
                info!("Falling back to individual requests");
                self.fetch_individually(account_ids).await
            }
        }
    }

    /// Sequential per-account requests; a failure on one id never stops the
    /// remaining ids from being attempted.
    async fn fetch_individually(&mut self, account_ids: &[i64]) -> Vec<ObservedStatus> {
        let mut observed = Vec::with_capacity(account_ids.len());

        for &account_id in account_ids {
            self.limiter.acquire().await;

            match self.platform.get_profile(account_id).await {
                Ok(profile) => observed.push(normalize(profile)),
                Err(Error::RateLimited { retry_after_secs }) => {
                    warn!("Hit remote rate limit on account {account_id}, waiting {retry_after_secs}s");
                    sleep(Duration::from_secs(retry_after_secs)).await;
                }
                Err(Error::Protocol(e)) => {
                    error!("Protocol error for account {account_id}: {e}");
                }
                Err(e) => {
                    error!("Error fetching account {account_id}: {e}");
                }
            }
        }

        observed
    }

    pub async fn connection_status(&self) -> Result<ConnectionStatus, Error> {
        self.platform.get_connection_status().await
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.platform.disconnect().await
    }
}

/// Maps the remote signal onto the closed status tag set. Only an offline
/// signal carries a last-seen time, taken verbatim from the reply.
fn normalize(profile: Profile) -> ObservedStatus {
    let recorded_at = time::now();

    let (status, was_online) = match profile.signal {
        PresenceSignal::Online => (PresenceStatus::Online, None),
        PresenceSignal::Offline { was_online } => (PresenceStatus::Offline, Some(was_online)),
        PresenceSignal::Recently => (PresenceStatus::Recently, None),
        PresenceSignal::Other(kind) => {
            debug!("Account {} reported signal {kind:?}", profile.account_id);
            (PresenceStatus::Unknown, None)
        }
    };

    ObservedStatus {
        account: TrackedAccount {
            account_id: profile.account_id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            updated_at: recorded_at,
        },
        status,
        was_online,
        recorded_at,
    }
}
