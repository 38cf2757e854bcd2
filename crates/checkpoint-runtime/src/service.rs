//! Single-consumer scan service
//!
//! Lanes that push credentials from their own tasks send them through one
//! queue. Each scan is stamped when it is sent, so time spent waiting in
//! the queue does not shift its debounce or dwell arithmetic. A single task
//! owns the `Checkpoint` and handles each scan to completion before
//! receiving the next, so classification is never re-entered.

use std::sync::Arc;
use std::time::Duration;

use checkpoint_core::{CheckpointError, CheckpointResult, CredentialId, Lane, ScanEvent};
use checkpoint_state::LogEntry;
use checkpoint_time::ClockSource;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{Checkpoint, Occupant};

/// Queue depth for pending commands
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

enum Command {
    Scan(ScanEvent),
    /// Sender could not read its clock; stamped by the checkpoint instead
    Unstamped { lane: Lane, id: CredentialId },
    Occupancy(oneshot::Sender<Vec<Occupant>>),
    DumpLog(oneshot::Sender<Vec<LogEntry>>),
    Shutdown,
}

/// Cloneable handle for lane tasks
#[derive(Clone)]
pub struct ScanSender {
    tx: mpsc::Sender<Command>,
    clock: Arc<dyn ClockSource>,
}

impl ScanSender {
    /// Stamp a scan with the current time and queue it for classification
    pub async fn scan(&self, lane: Lane, id: impl Into<CredentialId>) -> CheckpointResult<()> {
        let id = id.into();
        let command = match self.clock.now() {
            Ok(now) => Command::Scan(ScanEvent::new(lane, id, now)),
            Err(e) => {
                warn!(error = %e, %lane, "cannot stamp scan, deferring to checkpoint clock");
                Command::Unstamped { lane, id }
            }
        };
        self.submit(command).await
    }

    /// Queue a scan that was stamped by the lane itself
    pub async fn submit_event(&self, event: ScanEvent) -> CheckpointResult<()> {
        self.submit(Command::Scan(event)).await
    }

    async fn submit(&self, command: Command) -> CheckpointResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| CheckpointError::QueueClosed)
    }
}

/// Running checkpoint service
pub struct CheckpointService {
    sender: ScanSender,
    handle: JoinHandle<Checkpoint>,
}

impl CheckpointService {
    /// Start the checkpoint and spawn its consumer task.
    /// `clock` stamps scans as they are sent and should be the same time
    /// source the checkpoint reads. `refresh_every` drives the presentation
    /// timeout and the ready clock. Must be called from within a tokio
    /// runtime.
    pub fn spawn(
        mut checkpoint: Checkpoint,
        clock: Arc<dyn ClockSource>,
        refresh_every: Duration,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel(DEFAULT_QUEUE_DEPTH);

        let handle = tokio::spawn(async move {
            checkpoint.start();
            let mut ticker = interval(refresh_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        // Feedback playback blocks here; queued scans wait
                        Some(Command::Scan(event)) => {
                            checkpoint.submit(event);
                        }
                        Some(Command::Unstamped { lane, id }) => {
                            checkpoint.scan(lane, id);
                        }
                        Some(Command::Occupancy(reply)) => {
                            let _ = reply.send(checkpoint.occupancy());
                        }
                        Some(Command::DumpLog(reply)) => {
                            let _ = reply.send(checkpoint.dump_log());
                        }
                        Some(Command::Shutdown) | None => break,
                    },
                    _ = ticker.tick() => checkpoint.refresh(),
                }
            }

            info!(accepted = checkpoint.stats().scans_accepted, "checkpoint service stopped");
            checkpoint
        });

        CheckpointService {
            sender: ScanSender { tx, clock },
            handle,
        }
    }

    pub fn sender(&self) -> ScanSender {
        self.sender.clone()
    }

    pub async fn scan(&self, lane: Lane, id: impl Into<CredentialId>) -> CheckpointResult<()> {
        self.sender.scan(lane, id).await
    }

    /// Everyone currently inside
    pub async fn occupancy(&self) -> CheckpointResult<Vec<Occupant>> {
        self.request(Command::Occupancy).await
    }

    /// Retained log entries, also written to diagnostics
    pub async fn dump_log(&self) -> CheckpointResult<Vec<LogEntry>> {
        self.request(Command::DumpLog).await
    }

    /// Stop after draining commands already queued, returning the checkpoint
    pub async fn shutdown(self) -> CheckpointResult<Checkpoint> {
        debug!("checkpoint service shutting down");
        // Queue may already be closed if the task ended
        let _ = self.sender.tx.send(Command::Shutdown).await;
        self.handle.await.map_err(|_| CheckpointError::QueueClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> CheckpointResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .tx
            .send(make(reply_tx))
            .await
            .map_err(|_| CheckpointError::QueueClosed)?;
        reply_rx.await.map_err(|_| CheckpointError::QueueClosed)
    }
}
