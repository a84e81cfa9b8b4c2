//! Background refresh loop and retry dispatch.
//!
//! The poller owns the API client and executes refresh cycles - stats, then
//! messages, then health, each awaited before the next - on a fixed
//! interval, forwarding results to the UI thread over a channel. Operator
//! commands (manual refresh, message retry) arrive on a second channel and
//! run on the same task, so cycles are serialized: a slow cycle can never be
//! overtaken and overwritten by a newer one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, MessagesBody};
use crate::data::health::HealthCheck;
use crate::data::message::Hl7Message;
use crate::data::stats::RelayStats;

/// Which refresh step a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RefreshStep {
    Stats,
    Messages,
    Health,
}

impl RefreshStep {
    /// Short name for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            RefreshStep::Stats => "stats",
            RefreshStep::Messages => "messages",
            RefreshStep::Health => "health",
        }
    }
}

/// Updates pushed from the poller to the view.
#[derive(Debug)]
pub enum DashboardEvent {
    /// Fresh aggregate counters.
    Stats(RelayStats),
    /// Fresh failed-message snapshot (replaces the previous one).
    Messages(Vec<Hl7Message>),
    /// Latest health classification.
    Health(HealthCheck),
    /// A refresh step failed; the corresponding state keeps its previous
    /// value unless another event says otherwise.
    RefreshError { step: RefreshStep, detail: String },
    /// A retry request completed.
    RetryFinished {
        id: String,
        result: Result<(), String>,
    },
}

/// Operator commands executed by the poller task.
#[derive(Debug)]
pub enum PollerCommand {
    /// Run a full refresh cycle now, out of schedule.
    Refresh,
    /// Ask the backend to requeue the given message.
    Retry(String),
}

/// Handle to the running poller task.
///
/// At most one task runs per handle. Dropping the handle (or calling
/// [`PollerHandle::shutdown`]) aborts the task: the interval fires nothing
/// afterwards and in-flight requests are abandoned, not drained.
#[derive(Debug)]
pub struct PollerHandle {
    pub(crate) commands: mpsc::Sender<PollerCommand>,
    pub(crate) task: JoinHandle<()>,
}

impl PollerHandle {
    /// Request an immediate refresh cycle.
    pub fn refresh_now(&self) {
        let _ = self.commands.try_send(PollerCommand::Refresh);
    }

    /// Request a retry of the given failed message. No client-side
    /// dedup: two requests for the same id reach the backend twice.
    pub fn retry(&self, id: String) {
        let _ = self.commands.try_send(PollerCommand::Retry(id));
    }

    /// Stop the poller. Idempotent.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The background refresh task.
#[derive(Debug)]
pub struct Poller {
    client: ApiClient,
    events: mpsc::Sender<DashboardEvent>,
    commands: mpsc::Receiver<PollerCommand>,
    interval: Duration,
}

impl Poller {
    /// Spawn the poller task.
    ///
    /// The first full refresh runs immediately; subsequent cycles run every
    /// `interval`. Returns the handle and the event stream for the view.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(
        client: ApiClient,
        interval: Duration,
    ) -> (PollerHandle, mpsc::Receiver<DashboardEvent>) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (command_tx, command_rx) = mpsc::channel(16);

        let poller = Poller {
            client,
            events: event_tx,
            commands: command_rx,
            interval,
        };
        let task = tokio::spawn(poller.run());

        (
            PollerHandle {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh().await,
                command = self.commands.recv() => match command {
                    Some(PollerCommand::Refresh) => self.refresh().await,
                    Some(PollerCommand::Retry(id)) => self.handle_retry(id).await,
                    None => break,
                },
            }
        }
    }

    /// One full refresh cycle.
    ///
    /// Each step is fail-isolated: a failed step is logged and reported, and
    /// the remaining steps still run. No intra-cycle retries; the next tick
    /// is the retry mechanism.
    async fn refresh(&self) {
        match self.client.fetch_stats().await {
            Ok(stats) => self.emit(DashboardEvent::Stats(stats)).await,
            Err(err) => self.step_failed(RefreshStep::Stats, &err).await,
        }

        match self.client.fetch_failed_messages().await {
            Ok(MessagesBody::Messages(messages)) => {
                self.emit(DashboardEvent::Messages(messages)).await;
            }
            Ok(MessagesBody::Error(backend)) => {
                // Error reported as data in a 2xx body: show an empty queue.
                warn!(error = %backend.message, "messages endpoint returned an error body");
                self.emit(DashboardEvent::Messages(Vec::new())).await;
            }
            Err(err) if err.is_transport() => {
                // No usable response at all; the snapshot is cleared rather
                // than left stale.
                self.step_failed(RefreshStep::Messages, &err).await;
                self.emit(DashboardEvent::Messages(Vec::new())).await;
            }
            // Backend error status: keep the previous snapshot.
            Err(err) => self.step_failed(RefreshStep::Messages, &err).await,
        }

        let check = self.client.check_health().await;
        self.emit(DashboardEvent::Health(check)).await;
    }

    async fn handle_retry(&self, id: String) {
        match self.client.retry_message(&id).await {
            Ok(()) => {
                info!(message_id = %id, "message requeued");
                self.emit(DashboardEvent::RetryFinished {
                    id,
                    result: Ok(()),
                })
                .await;
                // Reflect the new backend state immediately instead of
                // waiting for the next scheduled tick.
                self.refresh().await;
            }
            Err(err) => {
                warn!(message_id = %id, error = %err, "retry failed");
                self.emit(DashboardEvent::RetryFinished {
                    id,
                    result: Err(err.to_string()),
                })
                .await;
            }
        }
    }

    async fn step_failed(&self, step: RefreshStep, err: &ApiError) {
        warn!(step = step.label(), error = %err, "refresh step failed");
        self.emit(DashboardEvent::RefreshError {
            step,
            detail: err.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: DashboardEvent) {
        // The receiver disappears only during teardown.
        let _ = self.events.send(event).await;
    }
}
