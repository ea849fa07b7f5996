use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::Error;
use crate::models::{PresenceStatus, StatusObservation, TrackedAccount};

/// Account store. Upserts keyed by the remote account id; the core never
/// deletes rows.
#[async_trait]
pub trait AccountRepo: Send + Sync + 'static {
    async fn upsert_account(&self, account: &TrackedAccount) -> Result<(), Error>;
    async fn get_account(&self, account_id: i64) -> Result<Option<TrackedAccount>, Error>;
}

/// Append-only status history. Every write is committed on its own; a
/// failed insert leaves no partial row behind.
#[async_trait]
pub trait ObservationRepo: Send + Sync + 'static {
    async fn append_observation(
        &self,
        account_id: i64,
        status: PresenceStatus,
        was_online: Option<NaiveDateTime>,
        recorded_at: NaiveDateTime,
    ) -> Result<i64, Error>;

    async fn recent_for_account(
        &self,
        account_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusObservation>, Error>;
}

// Module declarations
pub mod sqlite;
