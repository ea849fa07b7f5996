// src/repositories/sqlite/account.rs

use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::Error;
use crate::models::TrackedAccount;
use crate::repositories::AccountRepo;

#[derive(Clone)]
pub struct SqliteAccountRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAccountRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepo for SqliteAccountRepository {
    async fn upsert_account(&self, account: &TrackedAccount) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, username, first_name, last_name, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(account_id) DO UPDATE SET
                username   = excluded.username,
                first_name = excluded.first_name,
                last_name  = excluded.last_name,
                updated_at = excluded.updated_at
            "#,
        )
            .bind(account.account_id)
            .bind(&account.username)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<TrackedAccount>, Error> {
        let account = sqlx::query_as::<_, TrackedAccount>(
            r#"
            SELECT account_id, username, first_name, last_name, updated_at
            FROM accounts
            WHERE account_id = ?
            "#,
        )
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }
}
