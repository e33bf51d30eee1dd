//! Notification outbox worker.

use std::{future::Future, sync::Arc, time::Duration};

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::notifications::{
        errors::NotificationError, gateway::NotificationGateway, repository::PgOutboxRepository,
    },
};

/// Worker tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Messages claimed per round.
    pub batch_size: u32,

    /// Messages that failed this often are left for manual follow-up.
    pub max_attempts: u32,

    /// Delay after the first failure; doubles with each further failure.
    pub base_delay: Duration,

    pub max_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 10,
            base_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(6 * 60 * 60),
        }
    }
}

impl WorkerConfig {
    /// When a message that has already failed `attempts` times should be retried.
    pub fn retry_at(&self, now: Timestamp, attempts: u32) -> Timestamp {
        let factor = 1_u32.checked_shl(attempts).unwrap_or(u32::MAX);

        let delay = self
            .base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay));

        SignedDuration::try_from(delay)
            .ok()
            .and_then(|delay| now.checked_add(delay).ok())
            .unwrap_or(now)
    }
}

/// Outcome of one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub claimed: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Drains the notification outbox through a [`NotificationGateway`].
#[derive(Clone)]
pub struct NotificationWorker {
    db: Db,
    gateway: Arc<dyn NotificationGateway>,
    outbox: PgOutboxRepository,
    config: WorkerConfig,
}

impl NotificationWorker {
    #[must_use]
    pub fn new(db: Db, gateway: Arc<dyn NotificationGateway>, config: WorkerConfig) -> Self {
        Self {
            db,
            gateway,
            outbox: PgOutboxRepository::new(),
            config,
        }
    }

    /// Claims one batch of due messages and tries each once.
    ///
    /// # Errors
    ///
    /// Returns an error when the outbox cannot be read or updated. Gateway failures are recorded
    /// on the message instead.
    #[tracing::instrument(name = "notifications.worker.run_once", skip(self), err)]
    pub async fn run_once(&self, now: Timestamp) -> Result<WorkerReport, NotificationError> {
        let mut tx = self.db.begin().await?;

        let messages = self
            .outbox
            .claim_due(&mut tx, now, self.config.batch_size, self.config.max_attempts)
            .await?;

        let mut report = WorkerReport {
            claimed: messages.len(),
            ..WorkerReport::default()
        };

        for message in &messages {
            match self.gateway.send(message).await {
                Ok(()) => {
                    self.outbox.mark_delivered(&mut tx, message.uuid).await?;
                    report.delivered += 1;
                }
                Err(error) => {
                    let retry_at = self.config.retry_at(now, message.attempts);

                    warn!(
                        message_uuid = %message.uuid,
                        kind = message.kind.as_str(),
                        attempts = message.attempts + 1,
                        error = %error,
                        "notification delivery failed"
                    );

                    self.outbox
                        .mark_failed(&mut tx, message.uuid, &error.to_string(), retry_at)
                        .await?;

                    report.failed += 1;
                }
            }
        }

        tx.commit().await?;

        if report.claimed > 0 {
            info!(
                claimed = report.claimed,
                delivered = report.delivered,
                failed = report.failed,
                "processed notification batch"
            );
        }

        Ok(report)
    }

    /// Keeps draining until `shutdown` resolves, sleeping `poll_interval` whenever a round
    /// leaves nothing behind.
    pub async fn run_until<F>(&self, poll_interval: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let full_batch = match self.run_once(Timestamp::now()).await {
                Ok(report) => report.claimed >= self.config.batch_size as usize,
                Err(error) => {
                    warn!(error = %error, "notification round failed");
                    false
                }
            };

            if full_batch {
                continue;
            }

            tokio::select! {
                () = &mut shutdown => return,
                () = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}
