//! Periodic word rotation and broadcast.
//!
//! One background task owns the timer, so ticks never overlap. Broadcasts
//! go out after the new session has been published; message handlers read
//! the session store directly and are never blocked by a slow send.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::error::LookupFailure;
use crate::model::Session;
use crate::scoreboard::ScoreBoard;
use crate::session::SessionStore;
use crate::traits::{Transport, WordSource};

/// Configuration for the broadcast scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between rotations.
    pub interval: Duration,
    /// Words requested from the source per rotation.
    pub words_per_session: usize,
    /// Rotate once immediately instead of waiting a full interval.
    pub rotate_on_start: bool,
    /// Maximum broadcast sends in flight at once.
    pub max_concurrent_sends: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            words_per_session: 5,
            rotate_on_start: false,
            max_concurrent_sends: 16,
        }
    }
}

/// Outcome of one scheduled tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub session_id: Uuid,
    pub words: usize,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Rotates the active session on a timer and announces it to known users.
pub struct BroadcastScheduler {
    source: Arc<dyn WordSource>,
    sessions: Arc<SessionStore>,
    board: Arc<ScoreBoard>,
    transport: Arc<dyn Transport>,
    config: SchedulerConfig,
}

impl BroadcastScheduler {
    pub fn new(
        source: Arc<dyn WordSource>,
        sessions: Arc<SessionStore>,
        board: Arc<ScoreBoard>,
        transport: Arc<dyn Transport>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            source,
            sessions,
            board,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Fetch a fresh batch and publish it as the active session.
    ///
    /// On failure nothing is rotated and the previous session stays active.
    pub async fn rotate_now(&self) -> Result<Arc<Session>, LookupFailure> {
        let words = self.source.fetch(self.config.words_per_session).await?;
        Ok(self.sessions.rotate(words))
    }

    /// Rotate, then send the new session to every user on the scoreboard.
    pub async fn tick(&self) -> Result<TickReport, LookupFailure> {
        let session = self.rotate_now().await?;
        let recipients = self.board.users();
        let text = announcement(&session);

        let results: Vec<bool> = stream::iter(recipients.iter().copied())
            .map(|user| {
                let text = text.as_str();
                async move {
                    match self.transport.send(user, text).await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(%user, "broadcast send failed: {e:#}");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_sends.max(1))
            .collect()
            .await;

        let delivered = results.iter().filter(|ok| **ok).count();
        Ok(TickReport {
            session_id: session.id,
            words: session.words.len(),
            recipients: recipients.len(),
            delivered,
            failed: results.len() - delivered,
        })
    }

    /// Run ticks forever on the configured interval.
    pub async fn run(&self) {
        let period = self.config.interval.max(Duration::from_secs(1));
        let start = if self.config.rotate_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = self.source.name(),
            transport = self.transport.name(),
            interval_secs = period.as_secs(),
            "broadcast scheduler started"
        );

        loop {
            ticker.tick().await;
            match self.tick().await {
                Ok(report) => tracing::info!(
                    session = %report.session_id,
                    words = report.words,
                    recipients = report.recipients,
                    delivered = report.delivered,
                    failed = report.failed,
                    "broadcast complete"
                ),
                Err(e) => tracing::warn!(
                    permanent = e.is_permanent(),
                    "rotation skipped, previous session stays active: {e}"
                ),
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Broadcast text for a session.
pub fn announcement(session: &Session) -> String {
    format!("New Words:\n{}", session.render())
}
