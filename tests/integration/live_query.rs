//! Integration tests for the live query composer.
//!
//! Verifies the reactive pipeline end to end: the initial emission,
//! re-emission on search/preference/table changes, and that rapid input
//! changes settle on the latest combination.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use taskdeck::prefs::FilterPrefs;
use taskdeck::query::LiveQuery;
use taskdeck::store::{StoreCommand, StoreHandle, spawn_store};
use taskdeck_core::{SortOrder, Task, TaskStore};

const WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

struct Pipeline {
    store: TaskStore,
    handle: StoreHandle,
    search_tx: watch::Sender<String>,
    prefs_tx: watch::Sender<FilterPrefs>,
    results_rx: watch::Receiver<Vec<Task>>,
    _live: LiveQuery,
}

fn make_pipeline() -> Pipeline {
    let store = TaskStore::in_memory().expect("in-memory store");
    let (handle, _evt_rx) = spawn_store(store.clone());
    let (search_tx, search_rx) = watch::channel(String::new());
    let (prefs_tx, prefs_rx) = watch::channel(FilterPrefs::default());
    let live = LiveQuery::spawn(handle.clone(), search_rx, prefs_rx);
    let results_rx = live.results();
    Pipeline {
        store,
        handle,
        search_tx,
        prefs_tx,
        results_rx,
        _live: live,
    }
}

async fn wait_for<F>(rx: &mut watch::Receiver<Vec<Task>>, pred: F) -> Vec<Task>
where
    F: FnMut(&Vec<Task>) -> bool,
{
    timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("result never arrived")
        .expect("composer stopped")
        .clone()
}

// --- initial emission ---

#[tokio::test]
async fn emits_initial_result_without_any_input_change() {
    let mut pipeline = make_pipeline();
    pipeline.store.seed_demo().unwrap();
    // Seeding bypassed the worker; nudge the composer via a worker
    // mutation so the pre-seeded rows show up too.
    pipeline
        .handle
        .try_send(StoreCommand::Create {
            name: "Buy groceries".to_string(),
            important: false,
        })
        .unwrap();

    let tasks = wait_for(&mut pipeline.results_rx, |t| t.len() == 7).await;
    assert_eq!(tasks.len(), 7);
}

#[tokio::test]
async fn empty_table_emits_empty_list() {
    let mut pipeline = make_pipeline();
    pipeline
        .handle
        .try_send(StoreCommand::Create {
            name: "Call mom".to_string(),
            important: false,
        })
        .unwrap();
    // Once the created row shows up we know at least one full query
    // cycle ran; the initial emission before it was the empty list.
    wait_for(&mut pipeline.results_rx, |t| t.len() == 1).await;
}

// --- re-emission on input changes ---

#[tokio::test]
async fn search_change_narrows_results() {
    let mut pipeline = make_pipeline();
    pipeline.store.seed_demo().unwrap();
    pipeline.search_tx.send("wash".to_string()).unwrap();

    let tasks = wait_for(&mut pipeline.results_rx, |t| {
        !t.is_empty() && t.iter().all(|t| t.name.contains("Wash"))
    })
    .await;
    // Two seed rows share the name "Wash the dishes".
    assert_eq!(tasks.len(), 2);
}

#[tokio::test]
async fn prefs_change_reruns_query() {
    let mut pipeline = make_pipeline();
    pipeline.store.seed_demo().unwrap();

    pipeline
        .prefs_tx
        .send(FilterPrefs {
            sort_order: SortOrder::ByDate,
            hide_completed: true,
        })
        .unwrap();

    // Seed data has exactly two completed rows.
    let tasks = wait_for(&mut pipeline.results_rx, |t| t.len() == 4).await;
    assert!(tasks.iter().all(|t| !t.completed));
}

#[tokio::test]
async fn table_mutation_reruns_query() {
    let mut pipeline = make_pipeline();

    pipeline
        .handle
        .try_send(StoreCommand::Create {
            name: "Prepare food".to_string(),
            important: false,
        })
        .unwrap();
    let tasks = wait_for(&mut pipeline.results_rx, |t| t.len() == 1).await;

    pipeline
        .handle
        .try_send(StoreCommand::Delete(tasks[0].clone()))
        .unwrap();
    wait_for(&mut pipeline.results_rx, Vec::is_empty).await;
}

// --- switch-to-latest ---

#[tokio::test]
async fn rapid_input_changes_settle_on_latest() {
    let mut pipeline = make_pipeline();
    pipeline.store.seed_demo().unwrap();

    // Burst of changes; intermediate values may be skipped entirely,
    // but the final state must reflect the last one.
    for search in ["w", "wa", "was", "wash", ""] {
        pipeline.search_tx.send(search.to_string()).unwrap();
    }
    pipeline
        .prefs_tx
        .send(FilterPrefs {
            sort_order: SortOrder::ByName,
            hide_completed: false,
        })
        .unwrap();

    let tasks = wait_for(&mut pipeline.results_rx, |t| t.len() == 6).await;
    // Important first, then case-insensitive alphabetical.
    assert_eq!(tasks[0].name, "Buy groceries");
    let rest: Vec<String> = tasks[1..]
        .iter()
        .map(|t| t.name.to_lowercase())
        .collect();
    let mut sorted = rest.clone();
    sorted.sort();
    assert_eq!(rest, sorted);
}

// --- teardown ---

#[tokio::test]
async fn stop_freezes_results() {
    let pipeline = make_pipeline();
    pipeline._live.stop();
    // Give the abort a moment to land.
    tokio::time::sleep(Duration::from_millis(50)).await;

    pipeline
        .handle
        .try_send(StoreCommand::Create {
            name: "Do the laundry".to_string(),
            important: false,
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(pipeline.results_rx.borrow().is_empty());
}
