//! Debounced, last-write-wins persistence on a background worker.

use std::{
    sync::{
        mpsc::{self, RecvTimeoutError, Sender},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::ledger::BudgetState;

use super::{SaveOutcome, StateStorage};

/// Progress of the most recent save, for display next to the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Pending,
    Saving,
    Saved,
    Error(String),
}

impl SaveStatus {
    pub fn label(&self) -> &str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Pending => "Unsaved changes",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error(_) => "Save failed",
        }
    }
}

enum Command {
    Submit(BudgetState, u64),
    Flush(Sender<SaveOutcome>),
    Shutdown,
}

#[derive(Debug)]
struct StatusCell {
    status: SaveStatus,
    changed_at: Instant,
    /// Generation of the newest submission; writes of older payloads leave the
    /// status at `Pending`.
    latest: u64,
}

type SharedStatus = Arc<Mutex<StatusCell>>;

fn lock(status: &SharedStatus) -> MutexGuard<'_, StatusCell> {
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn set_status(status: &SharedStatus, next: SaveStatus) {
    let mut cell = lock(status);
    cell.status = next;
    cell.changed_at = Instant::now();
}

/// Applies `next` only while `generation` is still the newest submission.
fn set_status_for(status: &SharedStatus, generation: u64, next: SaveStatus) {
    let mut cell = lock(status);
    if cell.latest == generation {
        cell.status = next;
        cell.changed_at = Instant::now();
    }
}

/// Holds at most one pending state and writes it once submissions go quiet.
///
/// Every submission replaces the pending payload and restarts the quiet period.
/// Dropping the writer flushes whatever is still pending.
pub struct DebouncedWriter {
    sender: Sender<Command>,
    status: SharedStatus,
    status_reset: Duration,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedWriter {
    pub fn new(storage: Arc<dyn StateStorage>, delay: Duration, status_reset: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let status: SharedStatus = Arc::new(Mutex::new(StatusCell {
            status: SaveStatus::Idle,
            changed_at: Instant::now(),
            latest: 0,
        }));
        let worker_status = Arc::clone(&status);
        let worker = thread::spawn(move || {
            let mut pending: Option<(BudgetState, u64)> = None;
            loop {
                let command = if pending.is_some() {
                    match receiver.recv_timeout(delay) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => Some(Command::Shutdown),
                    }
                } else {
                    match receiver.recv() {
                        Ok(command) => Some(command),
                        Err(_) => Some(Command::Shutdown),
                    }
                };

                match command {
                    None => {
                        if let Some((state, generation)) = pending.take() {
                            write(storage.as_ref(), &worker_status, &state, generation);
                        }
                    }
                    Some(Command::Submit(state, generation)) => {
                        pending = Some((state, generation))
                    }
                    Some(Command::Flush(ack)) => {
                        let outcome = match pending.take() {
                            Some((state, generation)) => {
                                write(storage.as_ref(), &worker_status, &state, generation)
                            }
                            None => SaveOutcome::ok(),
                        };
                        let _ = ack.send(outcome);
                    }
                    Some(Command::Shutdown) => {
                        if let Some((state, generation)) = pending.take() {
                            write(storage.as_ref(), &worker_status, &state, generation);
                        }
                        break;
                    }
                }
            }
            tracing::debug!("save worker stopped");
        });

        Self {
            sender,
            status,
            status_reset,
            worker: Some(worker),
        }
    }

    /// Queues `state` for writing, replacing anything still pending.
    pub fn submit(&self, state: BudgetState) {
        let generation = {
            let mut cell = lock(&self.status);
            cell.latest += 1;
            cell.status = SaveStatus::Pending;
            cell.changed_at = Instant::now();
            cell.latest
        };
        if self.sender.send(Command::Submit(state, generation)).is_err() {
            tracing::error!("save worker is not running; change dropped");
            set_status(
                &self.status,
                SaveStatus::Error("save worker is not running".into()),
            );
        }
    }

    /// Writes the pending state now and reports the outcome.
    pub fn flush(&self) -> SaveOutcome {
        let (ack, outcome) = mpsc::channel();
        if self.sender.send(Command::Flush(ack)).is_err() {
            return SaveOutcome::failed("save worker is not running");
        }
        outcome
            .recv()
            .unwrap_or_else(|_| SaveOutcome::failed("save worker stopped before flushing"))
    }

    /// Current status; `Saved` reads as `Idle` once the reset period has passed.
    pub fn status(&self) -> SaveStatus {
        let cell = lock(&self.status);
        match cell.status {
            SaveStatus::Saved if cell.changed_at.elapsed() >= self.status_reset => {
                SaveStatus::Idle
            }
            ref status => status.clone(),
        }
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("save worker panicked");
            }
        }
    }
}

fn write(
    storage: &dyn StateStorage,
    status: &SharedStatus,
    state: &BudgetState,
    generation: u64,
) -> SaveOutcome {
    set_status_for(status, generation, SaveStatus::Saving);
    let outcome = SaveOutcome::from(storage.save(state));
    match &outcome.error {
        None => {
            tracing::debug!(transactions = state.transactions.len(), "budget state saved");
            set_status_for(status, generation, SaveStatus::Saved);
        }
        Some(message) => {
            tracing::error!(error = %message, "failed to save budget state");
            set_status_for(status, generation, SaveStatus::Error(message.clone()));
        }
    }
    outcome
}
