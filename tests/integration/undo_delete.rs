//! Integration tests for delete-with-undo.
//!
//! Deleting a task keeps a copy on the client side; undo re-inserts
//! that copy verbatim, so the restored row is byte-for-byte identical
//! (same id, name, flags, and creation timestamp).

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tokio::time::timeout;

use taskdeck::store::{StoreCommand, spawn_store};
use taskdeck_core::{TaskFilter, TaskStore};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn delete_then_undo_restores_identical_row() {
    let store = TaskStore::in_memory().expect("in-memory store");
    let (handle, _evt_rx) = spawn_store(store.clone());

    let original = store.create("Buy groceries", true).unwrap();
    let retained = original.with_completed(true);
    store.update(&retained).unwrap();

    handle
        .try_send(StoreCommand::Delete(retained.clone()))
        .unwrap();
    let mut gen_rx = handle.generation();
    timeout(WAIT, gen_rx.wait_for(|g| *g == 1))
        .await
        .expect("delete never applied")
        .unwrap();
    assert!(store.find(retained.id).unwrap().is_none());

    handle
        .try_send(StoreCommand::Insert(retained.clone()))
        .unwrap();
    timeout(WAIT, gen_rx.wait_for(|g| *g == 2))
        .await
        .expect("undo never applied")
        .unwrap();

    let restored = store.find(retained.id).unwrap().unwrap();
    assert_eq!(restored, retained);
    assert_eq!(restored.created_ms, retained.created_ms);
}

#[tokio::test]
async fn undo_after_external_recreate_overwrites_by_id() {
    let store = TaskStore::in_memory().expect("in-memory store");
    let (handle, _evt_rx) = spawn_store(store.clone());

    let original = store.create("Wash the dishes", false).unwrap();
    store.delete(&original).unwrap();

    // Another edit re-uses the row id before the undo lands.
    let usurper = original.with_important(true);
    store.insert(&usurper).unwrap();

    // Undo is an upsert: last write wins on the shared id.
    handle
        .try_send(StoreCommand::Insert(original.clone()))
        .unwrap();
    let mut gen_rx = handle.generation();
    timeout(WAIT, gen_rx.wait_for(|g| *g >= 1))
        .await
        .expect("undo never applied")
        .unwrap();

    assert_eq!(store.find(original.id).unwrap().unwrap(), original);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn restored_row_reappears_in_query_results() {
    let store = TaskStore::in_memory().expect("in-memory store");
    let (handle, _evt_rx) = spawn_store(store.clone());

    let task = store.create("Call mom", false).unwrap();

    handle.try_send(StoreCommand::Delete(task.clone())).unwrap();
    handle.try_send(StoreCommand::Insert(task.clone())).unwrap();

    let tasks = timeout(WAIT, handle.query(TaskFilter::default()))
        .await
        .expect("query timed out")
        .expect("worker alive")
        .expect("query ok");
    assert_eq!(tasks, vec![task]);
}
