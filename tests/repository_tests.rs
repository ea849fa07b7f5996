// tests/repository_tests.rs

use chrono::Utc;
use sqlx::Row;

use watchbot::Database;
use watchbot::models::{PresenceStatus, TrackedAccount};
use watchbot::repositories::{AccountRepo, ObservationRepo};
use watchbot::repositories::sqlite::{SqliteAccountRepository, SqliteObservationRepository};

fn account(account_id: i64, username: &str) -> TrackedAccount {
    TrackedAccount {
        account_id,
        username: Some(username.to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
        updated_at: Utc::now().naive_utc(),
    }
}

async fn memory_db() -> anyhow::Result<Database> {
    let db = Database::new(":memory:").await?;
    db.migrate().await?;
    Ok(db)
}

#[tokio::test]
async fn upsert_is_keyed_by_account_id() -> anyhow::Result<()> {
    let db = memory_db().await?;
    let repo = SqliteAccountRepository::new(db.pool().clone());

    repo.upsert_account(&account(1, "old_name")).await?;
    repo.upsert_account(&account(1, "new_name")).await?;

    let retrieved = repo.get_account(1).await?.expect("account should exist");
    assert_eq!(retrieved.username.as_deref(), Some("new_name"));

    // Two upserts, one row.
    let row = sqlx::query("SELECT COUNT(*) AS n FROM accounts")
        .fetch_one(db.pool())
        .await?;
    let count: i64 = row.try_get("n")?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn identical_observations_append_distinct_rows() -> anyhow::Result<()> {
    let db = memory_db().await?;
    let accounts = SqliteAccountRepository::new(db.pool().clone());
    let observations = SqliteObservationRepository::new(db.pool().clone());

    accounts.upsert_account(&account(7, "watched")).await?;

    // Same status in two consecutive cycles still appends a fresh row.
    let first = observations
        .append_observation(7, PresenceStatus::Online, None, Utc::now().naive_utc())
        .await?;
    let second = observations
        .append_observation(7, PresenceStatus::Online, None, Utc::now().naive_utc())
        .await?;
    assert_ne!(first, second);

    let history = observations.recent_for_account(7, 10).await?;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|o| o.status == PresenceStatus::Online));

    Ok(())
}

#[tokio::test]
async fn was_online_round_trips_only_for_offline() -> anyhow::Result<()> {
    let db = memory_db().await?;
    let accounts = SqliteAccountRepository::new(db.pool().clone());
    let observations = SqliteObservationRepository::new(db.pool().clone());

    accounts.upsert_account(&account(3, "watched")).await?;

    let last_seen = Utc::now().naive_utc();
    observations
        .append_observation(3, PresenceStatus::Offline, Some(last_seen), Utc::now().naive_utc())
        .await?;
    observations
        .append_observation(3, PresenceStatus::Recently, None, Utc::now().naive_utc())
        .await?;

    let history = observations.recent_for_account(3, 10).await?;
    assert_eq!(history.len(), 2);
    for obs in &history {
        match obs.status {
            PresenceStatus::Offline => assert_eq!(obs.was_online, Some(last_seen)),
            _ => assert!(obs.was_online.is_none()),
        }
    }

    Ok(())
}

#[tokio::test]
async fn recent_for_account_is_newest_first_and_limited() -> anyhow::Result<()> {
    let db = memory_db().await?;
    let accounts = SqliteAccountRepository::new(db.pool().clone());
    let observations = SqliteObservationRepository::new(db.pool().clone());

    accounts.upsert_account(&account(5, "watched")).await?;

    let mut last_id = 0;
    for _ in 0..5 {
        last_id = observations
            .append_observation(5, PresenceStatus::Recently, None, Utc::now().naive_utc())
            .await?;
    }

    let history = observations.recent_for_account(5, 3).await?;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].observation_id, last_id);
    assert!(history[0].recorded_at >= history[2].recorded_at);

    Ok(())
}

#[tokio::test]
async fn migration_is_idempotent_on_an_existing_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("tracker.db");
    let db_url = db_path.to_str().expect("utf-8 path").to_string();

    {
        let db = Database::new(&db_url).await?;
        db.migrate().await?;

        let repo = SqliteAccountRepository::new(db.pool().clone());
        repo.upsert_account(&account(9, "persisted")).await?;
        db.close().await;
    }

    // Reopen the same file; migrate again and the data is still there.
    let db = Database::new(&db_url).await?;
    db.migrate().await?;

    let repo = SqliteAccountRepository::new(db.pool().clone());
    let retrieved = repo.get_account(9).await?;
    assert_eq!(retrieved.map(|a| a.username), Some(Some("persisted".to_string())));

    Ok(())
}
