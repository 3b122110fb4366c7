//! Live query composer: the reactive pipeline behind the task list.
//!
//! Three independent inputs (search text, filter preferences, and the
//! store's mutation generation) are recombined into one [`TaskFilter`]
//! whenever any of them changes (combine-latest: only the latest value
//! of each input matters). Each recombination issues a fresh query to
//! the store worker and drops the reply channel of any query still in
//! flight (switch-to-latest), so a slow superseded query can never
//! deliver after a newer one.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use taskdeck_core::{Task, TaskFilter};

use crate::prefs::FilterPrefs;
use crate::store::StoreHandle;

/// A running live view over the task table.
///
/// Holds the cancellable subscription: [`stop`](Self::stop) tears the
/// composer down, after which no further results are delivered.
pub struct LiveQuery {
    results: watch::Receiver<Vec<Task>>,
    task: JoinHandle<()>,
}

impl LiveQuery {
    /// Spawns the composer over the given inputs.
    ///
    /// The results watch starts empty; the first emission follows as
    /// soon as the initial query completes (every input already has a
    /// value, so the first tuple is available immediately).
    #[must_use]
    pub fn spawn(
        store: StoreHandle,
        search_rx: watch::Receiver<String>,
        prefs_rx: watch::Receiver<FilterPrefs>,
    ) -> Self {
        let (results_tx, results) = watch::channel(Vec::new());
        let gen_rx = store.generation();
        let task = tokio::spawn(async move {
            compose(store, search_rx, prefs_rx, gen_rx, results_tx).await;
        });
        Self { results, task }
    }

    /// A watch over the current result list.
    #[must_use]
    pub fn results(&self) -> watch::Receiver<Vec<Task>> {
        self.results.clone()
    }

    /// Stops the composer. The current result stays readable but will
    /// never change again.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The composer loop.
///
/// Each iteration snapshots the latest value of every input, issues the
/// query, and then races the reply against the next input change. An
/// input change while the reply is pending supersedes the query: the
/// reply channel is dropped and the loop starts over with the new tuple.
async fn compose(
    store: StoreHandle,
    mut search_rx: watch::Receiver<String>,
    mut prefs_rx: watch::Receiver<FilterPrefs>,
    mut gen_rx: watch::Receiver<u64>,
    results_tx: watch::Sender<Vec<Task>>,
) {
    loop {
        let filter = snapshot_filter(&mut search_rx, &mut prefs_rx, &mut gen_rx);
        debug!(?filter, "issuing live query");

        let Ok(mut reply) = store.start_query(filter).await else {
            debug!("store worker gone, live query ends");
            return;
        };

        let superseded = tokio::select! {
            res = &mut reply => {
                match res {
                    Ok(Ok(tasks)) => {
                        if results_tx.send(tasks).is_err() {
                            // No one is watching anymore.
                            return;
                        }
                    }
                    Ok(Err(e)) => warn!(error = %e, "live query failed"),
                    Err(_) => return,
                }
                false
            }
            changed = input_changed(&mut search_rx, &mut prefs_rx, &mut gen_rx) => {
                if !changed {
                    return;
                }
                // Dropping `reply` here cancels delivery of the stale
                // result; the worker's send fails and is ignored.
                true
            }
        };
        if superseded {
            continue;
        }

        // Result delivered; sleep until any input moves again.
        if !input_changed(&mut search_rx, &mut prefs_rx, &mut gen_rx).await {
            return;
        }
    }
}

/// Reads the latest value of each input, marking them all as seen.
fn snapshot_filter(
    search_rx: &mut watch::Receiver<String>,
    prefs_rx: &mut watch::Receiver<FilterPrefs>,
    gen_rx: &mut watch::Receiver<u64>,
) -> TaskFilter {
    let search = search_rx.borrow_and_update().clone();
    let prefs = *prefs_rx.borrow_and_update();
    gen_rx.borrow_and_update();
    TaskFilter::new(search, prefs.sort_order, prefs.hide_completed)
}

/// Waits for any input to change. Returns `false` when an input's
/// sender is gone, which means the session is shutting down.
async fn input_changed(
    search_rx: &mut watch::Receiver<String>,
    prefs_rx: &mut watch::Receiver<FilterPrefs>,
    gen_rx: &mut watch::Receiver<u64>,
) -> bool {
    tokio::select! {
        r = search_rx.changed() => r.is_ok(),
        r = prefs_rx.changed() => r.is_ok(),
        r = gen_rx.changed() => r.is_ok(),
    }
}
