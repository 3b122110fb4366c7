//! Integration tests for the store worker.
//!
//! Verifies command ordering (a mutation issued before a query is
//! visible to that query), generation-counter bumps, error reporting,
//! and shutdown behavior.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio::time::timeout;

use taskdeck::store::{StoreCommand, StoreEvent, spawn_store};
use taskdeck_core::{SortOrder, Task, TaskFilter, TaskId, TaskStore};

const WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn make_store() -> TaskStore {
    TaskStore::in_memory().expect("in-memory store")
}

fn make_task(id: i64, name: &str) -> Task {
    Task {
        id: TaskId::from_i64(id),
        name: name.to_string(),
        important: false,
        completed: false,
        created_ms: 1_000,
    }
}

// --- ordering tests ---

#[tokio::test]
async fn mutation_is_visible_to_following_query() {
    let (handle, _evt_rx) = spawn_store(make_store());

    handle
        .try_send(StoreCommand::Create {
            name: "Buy groceries".to_string(),
            important: true,
        })
        .unwrap();

    // The query command queues behind the create, so it must see the row.
    let tasks = timeout(WAIT, handle.query(TaskFilter::default()))
        .await
        .expect("query timed out")
        .expect("worker alive")
        .expect("query ok");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Buy groceries");
    assert!(tasks[0].important);
}

#[tokio::test]
async fn commands_apply_in_submission_order() {
    let store = make_store();
    let (handle, _evt_rx) = spawn_store(store.clone());

    let task = store.create("Wash the dishes", false).unwrap();
    let edited = task.with_completed(true);

    handle.try_send(StoreCommand::Update(edited)).unwrap();
    handle.try_send(StoreCommand::Delete(task.clone())).unwrap();
    handle.try_send(StoreCommand::Insert(task.clone())).unwrap();

    let tasks = timeout(WAIT, handle.query(TaskFilter::default()))
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    // Update, then delete, then verbatim re-insert: the original row wins.
    assert_eq!(tasks, vec![task]);
}

// --- generation counter tests ---

#[tokio::test]
async fn generation_bumps_once_per_effective_mutation() {
    let (handle, _evt_rx) = spawn_store(make_store());
    let mut gen_rx = handle.generation();
    assert_eq!(*gen_rx.borrow(), 0);

    handle
        .try_send(StoreCommand::Create {
            name: "Call mom".to_string(),
            important: false,
        })
        .unwrap();

    timeout(WAIT, gen_rx.wait_for(|g| *g == 1))
        .await
        .expect("generation never bumped")
        .unwrap();
}

#[tokio::test]
async fn update_of_missing_row_does_not_bump_generation() {
    let (handle, _evt_rx) = spawn_store(make_store());
    let mut gen_rx = handle.generation();

    // Processed first; affects zero rows.
    handle
        .try_send(StoreCommand::Update(make_task(404, "Ghost")))
        .unwrap();
    handle
        .try_send(StoreCommand::Delete(make_task(404, "Ghost")))
        .unwrap();
    // Processed last; the only effective mutation.
    handle
        .try_send(StoreCommand::Create {
            name: "Do the laundry".to_string(),
            important: false,
        })
        .unwrap();

    let generation = *timeout(WAIT, gen_rx.wait_for(|g| *g >= 1))
        .await
        .expect("generation never bumped")
        .unwrap();
    assert_eq!(generation, 1);
}

// --- error reporting tests ---

#[tokio::test]
async fn invalid_create_reports_error_event() {
    let (handle, mut evt_rx) = spawn_store(make_store());

    handle
        .try_send(StoreCommand::Create {
            name: String::new(),
            important: false,
        })
        .unwrap();

    let event = timeout(WAIT, evt_rx.recv())
        .await
        .expect("no event arrived")
        .expect("event channel open");
    let StoreEvent::Error(msg) = event;
    assert!(msg.contains("empty"), "unexpected message: {msg}");

    // The failed mutation left the table untouched.
    let tasks = handle
        .query(TaskFilter::default())
        .await
        .unwrap()
        .unwrap();
    assert!(tasks.is_empty());
}

// --- shutdown tests ---

#[tokio::test]
async fn shutdown_stops_answering_queries() {
    let (handle, _evt_rx) = spawn_store(make_store());

    handle.try_send(StoreCommand::Shutdown).unwrap();

    let filter = TaskFilter::new(String::new(), SortOrder::ByName, false);
    let result = timeout(WAIT, handle.query(filter)).await.unwrap();
    assert!(result.is_err());
}
