// src/services/tracker.rs
//
// The poll engine: fetch -> persist -> sleep, repeated until a stop request
// or an unrecoverable startup failure.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::Error;
use crate::db::Database;
use crate::platforms::{ConnectionStatus, PresencePlatform};
use crate::repositories::{AccountRepo, ObservationRepo};
use crate::services::status_fetcher::StatusFetcher;

/// Short sleep after a failed cycle, bounding the rate of repeated
/// failures without stalling until the next regular interval.
const FAILURE_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Stopped,
}

/// Drives the poll cycle over a fixed set of account ids. Owns the
/// persistence handle and the remote session (through the fetcher) for the
/// engine's lifetime; a stop request takes effect at the inter-cycle sleep,
/// never mid-cycle.
pub struct Tracker<P, A, O>
where
    P: PresencePlatform,
{
    inner: Arc<TrackerInner<P, A, O>>,
}

struct TrackerInner<P, A, O>
where
    P: PresencePlatform,
{
    db: Database,
    fetcher: tokio::sync::Mutex<StatusFetcher<P>>,
    accounts: A,
    observations: O,
    account_ids: Vec<i64>,
    check_interval: Duration,
    state: Mutex<TrackerState>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<P, A, O> Clone for Tracker<P, A, O>
where
    P: PresencePlatform,
{
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<P, A, O> Tracker<P, A, O>
where
    P: PresencePlatform + 'static,
    A: AccountRepo,
    O: ObservationRepo,
{
    pub fn new(
        db: Database,
        fetcher: StatusFetcher<P>,
        accounts: A,
        observations: O,
        account_ids: Vec<i64>,
        check_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            inner: Arc::new(TrackerInner {
                db,
                fetcher: tokio::sync::Mutex::new(fetcher),
                accounts,
                observations,
                account_ids,
                check_interval,
                state: Mutex::new(TrackerState::Idle),
                shutdown_tx,
                shutdown_rx,
            }),
        }
    }

    pub fn state(&self) -> TrackerState {
        *self.inner.state.lock().unwrap()
    }

    /// Requests an orderly shutdown. Interrupts the inter-cycle sleep; a
    /// cycle already in flight finishes first. No-op unless running.
    pub fn stop(&self) {
        let state = self.inner.state.lock().unwrap();
        if *state != TrackerState::Running {
            return;
        }
        info!("Stop requested");
        let _ = self.inner.shutdown_tx.send(true);
    }

    /// Initializes the store and verifies the remote session, then runs the
    /// cycle loop until stopped. A startup failure is terminal: the tracker
    /// moves straight to `Stopped` and the error propagates to the caller.
    pub async fn start(&self) -> Result<(), Error> {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state != TrackerState::Idle {
                return Err(Error::Config("tracker already started".to_string()));
            }
            *state = TrackerState::Running;
        }

        if let Err(e) = self.initialize().await {
            *self.inner.state.lock().unwrap() = TrackerState::Stopped;
            return Err(e);
        }

        info!(
            "Tracking {} accounts every {}s",
            self.inner.account_ids.len(),
            self.inner.check_interval.as_secs()
        );

        let mut shutdown_rx = self.inner.shutdown_rx.clone();
        loop {
            match self.run_cycle().await {
                Ok(()) => {
                    if self.sleep_or_shutdown(self.inner.check_interval, &mut shutdown_rx).await {
                        break;
                    }
                }
                Err(e) => {
                    error!("Tracking cycle failed: {e}");
                    if self.sleep_or_shutdown(FAILURE_BACKOFF, &mut shutdown_rx).await {
                        break;
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn initialize(&self) -> Result<(), Error> {
        self.inner.db.migrate().await?;

        let status = self.inner.fetcher.lock().await.connection_status().await?;
        if status != ConnectionStatus::Connected {
            return Err(Error::Platform(format!(
                "remote session is not connected: {status:?}"
            )));
        }

        Ok(())
    }

    /// One fetch -> persist pass. Per-item persistence failures are logged
    /// and the remaining items still written; the cycle only counts as
    /// failed when every single write failed (store presumed down).
    async fn run_cycle(&self) -> Result<(), Error> {
        let observed = {
            let mut fetcher = self.inner.fetcher.lock().await;
            fetcher.fetch_all(&self.inner.account_ids).await
        };

        info!(
            "Cycle fetched {} of {} tracked accounts",
            observed.len(),
            self.inner.account_ids.len()
        );

        let total = observed.len();
        let mut failed = 0usize;
        let mut last_error = None;

        for obs in observed {
            let account_id = obs.account.account_id;

            // The account row must exist before its observation; skip the
            // observation when the upsert failed.
            if let Err(e) = self.inner.accounts.upsert_account(&obs.account).await {
                error!("Failed to upsert account {account_id}: {e}");
                failed += 1;
                last_error = Some(e);
                continue;
            }

            if let Err(e) = self
                .inner
                .observations
                .append_observation(account_id, obs.status, obs.was_online, obs.recorded_at)
                .await
            {
                error!("Failed to record status for account {account_id}: {e}");
                failed += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) if failed == total && total > 0 => Err(e),
            _ => Ok(()),
        }
    }

    /// Returns true when a shutdown request arrived during the sleep.
    async fn sleep_or_shutdown(
        &self,
        duration: Duration,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> bool {
        tokio::select! {
            _ = sleep(duration) => false,
            Ok(_) = shutdown_rx.changed() => *shutdown_rx.borrow(),
        }
    }

    async fn shutdown(&self) {
        if let Err(e) = self.inner.fetcher.lock().await.disconnect().await {
            warn!("Error disconnecting remote session: {e}");
        }
        self.inner.db.close().await;

        *self.inner.state.lock().unwrap() = TrackerState::Stopped;
        info!("Tracker stopped");
    }
}
