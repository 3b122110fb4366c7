//! Store worker for wiring the TUI to the SQLite task table.
//!
//! This module bridges the synchronous TUI event loop (crossterm
//! poll-based) with the persistence layer. A single background tokio
//! task owns the [`TaskStore`] and processes [`StoreCommand`]s strictly
//! in order, so a mutation issued before a query is always visible to
//! that query.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ─── StoreCommand →  store worker task
//!                    ←── StoreEvent ───
//!                    ←── generation ───  (watch, bumped per mutation)
//! ```
//!
//! The generation counter is the table's change notification: every
//! successful mutation bumps it, and the live query composer re-runs
//! its query whenever it moves.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use taskdeck_core::{StoreError, Task, TaskFilter, TaskStore};

/// Commands sent from the TUI main loop to the store worker.
#[derive(Debug)]
pub enum StoreCommand {
    /// Create a new task with a fresh id and timestamp.
    Create {
        /// Task name as entered by the user.
        name: String,
        /// Whether the task is marked important.
        important: bool,
    },
    /// Upsert a task by id (full field replacement; the undo path).
    Insert(Task),
    /// Update name/important/completed of an existing row.
    Update(Task),
    /// Delete the row matching the task's id.
    Delete(Task),
    /// One-shot filtered read, serialized behind any preceding mutations.
    Query {
        /// The search/sort/hide-completed combination to run.
        filter: TaskFilter,
        /// Where the result list is delivered. Dropped receivers are
        /// fine; the send failure is ignored.
        reply: oneshot::Sender<Result<Vec<Task>, StoreError>>,
    },
    /// Gracefully stop the worker.
    Shutdown,
}

/// Events sent from the store worker to the TUI main loop.
#[derive(Debug)]
pub enum StoreEvent {
    /// A mutation failed; shown on the status line.
    Error(String),
}

/// Default capacity for the command and event channels.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Handle to the store worker.
///
/// Cloneable; all clones feed the same worker task.
#[derive(Clone)]
pub struct StoreHandle {
    cmd_tx: mpsc::Sender<StoreCommand>,
    generation: watch::Receiver<u64>,
}

/// The store worker has stopped and can no longer answer queries.
#[derive(Debug, thiserror::Error)]
#[error("task store worker is not running")]
pub struct StoreClosed;

impl StoreHandle {
    /// A watch over the mutation generation counter. Changes whenever
    /// the table changes.
    #[must_use]
    pub fn generation(&self) -> watch::Receiver<u64> {
        self.generation.clone()
    }

    /// Sends a command without waiting for capacity.
    ///
    /// # Errors
    ///
    /// Returns the `try_send` error so the caller can distinguish a full
    /// channel from a stopped worker.
    pub fn try_send(
        &self,
        cmd: StoreCommand,
    ) -> Result<(), mpsc::error::TrySendError<StoreCommand>> {
        self.cmd_tx.try_send(cmd)
    }

    /// Sends a query command, returning the reply channel without
    /// waiting for the result. Dropping the returned receiver cancels
    /// delivery (the worker's send fails silently), which is what the
    /// live query composer relies on to discard superseded queries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreClosed`] if the worker has stopped.
    pub async fn start_query(
        &self,
        filter: TaskFilter,
    ) -> Result<oneshot::Receiver<Result<Vec<Task>, StoreError>>, StoreClosed> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(StoreCommand::Query { filter, reply })
            .await
            .map_err(|_| StoreClosed)?;
        Ok(rx)
    }

    /// Runs a full query round trip (one-shot reads and tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreClosed`] if the worker stopped before answering;
    /// store-level failures come back inside the `Ok` as `Err(StoreError)`.
    pub async fn query(
        &self,
        filter: TaskFilter,
    ) -> Result<Result<Vec<Task>, StoreError>, StoreClosed> {
        let rx = self.start_query(filter).await?;
        rx.await.map_err(|_| StoreClosed)
    }
}

/// Spawns the store worker and returns its handle plus the event stream.
///
/// The worker owns `store` and runs until [`StoreCommand::Shutdown`] is
/// received or every [`StoreHandle`] clone has been dropped.
#[must_use]
pub fn spawn_store(store: TaskStore) -> (StoreHandle, mpsc::Receiver<StoreEvent>) {
    spawn_store_with_capacity(store, DEFAULT_CHANNEL_CAPACITY)
}

/// Like [`spawn_store`] with an explicit channel capacity.
#[must_use]
pub fn spawn_store_with_capacity(
    store: TaskStore,
    capacity: usize,
) -> (StoreHandle, mpsc::Receiver<StoreEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<StoreCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<StoreEvent>(capacity);
    let (gen_tx, gen_rx) = watch::channel(0u64);

    tokio::spawn(async move {
        store_worker(store, cmd_rx, gen_tx, evt_tx).await;
    });

    (
        StoreHandle {
            cmd_tx,
            generation: gen_rx,
        },
        evt_rx,
    )
}

/// Background task: process commands in arrival order.
async fn store_worker(
    store: TaskStore,
    mut cmd_rx: mpsc::Receiver<StoreCommand>,
    gen_tx: watch::Sender<u64>,
    evt_tx: mpsc::Sender<StoreEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            StoreCommand::Create { name, important } => {
                match store.create(&name, important) {
                    Ok(task) => {
                        debug!(id = %task.id, "task created");
                        bump(&gen_tx);
                    }
                    Err(e) => report(&evt_tx, "create", &e),
                }
            }
            StoreCommand::Insert(task) => match store.insert(&task) {
                Ok(()) => {
                    debug!(id = %task.id, "task upserted");
                    bump(&gen_tx);
                }
                Err(e) => report(&evt_tx, "insert", &e),
            },
            StoreCommand::Update(task) => match store.update(&task) {
                Ok(0) => debug!(id = %task.id, "update matched no row"),
                Ok(_) => {
                    debug!(id = %task.id, "task updated");
                    bump(&gen_tx);
                }
                Err(e) => report(&evt_tx, "update", &e),
            },
            StoreCommand::Delete(task) => match store.delete(&task) {
                Ok(0) => debug!(id = %task.id, "delete matched no row"),
                Ok(_) => {
                    debug!(id = %task.id, "task deleted");
                    bump(&gen_tx);
                }
                Err(e) => report(&evt_tx, "delete", &e),
            },
            StoreCommand::Query { filter, reply } => {
                // The receiver may have been dropped by a superseding
                // query; a failed send is the cancellation taking effect.
                let _ = reply.send(store.query(&filter));
            }
            StoreCommand::Shutdown => {
                debug!("store worker shutting down");
                break;
            }
        }
    }
}

fn bump(gen_tx: &watch::Sender<u64>) {
    gen_tx.send_modify(|g| *g += 1);
}

fn report(evt_tx: &mpsc::Sender<StoreEvent>, op: &str, err: &StoreError) {
    warn!(op, error = %err, "store mutation failed");
    let _ = evt_tx.try_send(StoreEvent::Error(err.to_string()));
}
