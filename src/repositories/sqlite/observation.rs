// src/repositories/sqlite/observation.rs

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Row, Sqlite};

use crate::Error;
use crate::models::{PresenceStatus, StatusObservation};
use crate::repositories::ObservationRepo;

#[derive(Clone)]
pub struct SqliteObservationRepository {
    pool: Pool<Sqlite>,
}

impl SqliteObservationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ObservationRepo for SqliteObservationRepository {
    async fn append_observation(
        &self,
        account_id: i64,
        status: PresenceStatus,
        was_online: Option<NaiveDateTime>,
        recorded_at: NaiveDateTime,
    ) -> Result<i64, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO observations (account_id, status, was_online, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
            .bind(account_id)
            .bind(status.to_string())
            .bind(was_online)
            .bind(recorded_at)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent_for_account(
        &self,
        account_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusObservation>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT observation_id, account_id, status, was_online, recorded_at
            FROM observations
            WHERE account_id = ?
            ORDER BY recorded_at DESC, observation_id DESC
            LIMIT ?
            "#,
        )
            .bind(account_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            let status_str: String = row.try_get("status")?;
            let status = PresenceStatus::from_str(&status_str).map_err(Error::Parse)?;

            observations.push(StatusObservation {
                observation_id: row.try_get("observation_id")?,
                account_id: row.try_get("account_id")?,
                status,
                was_online: row.try_get("was_online")?,
                recorded_at: row.try_get("recorded_at")?,
            });
        }

        Ok(observations)
    }
}
