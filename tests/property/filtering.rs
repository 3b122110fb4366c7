//! Property-based tests for the task list query.
//!
//! Uses proptest to check the query contract against a reference model:
//! 1. Identical filters against an unchanged table return identical lists.
//! 2. The result set matches a plain in-memory predicate (substring match
//!    plus hide-completed).
//! 3. The result order matches the documented total order.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use taskdeck_core::{SortOrder, Task, TaskFilter, TaskId, TaskStore};

// --- Strategies ---

/// Task names: printable ASCII so SQLite's ASCII-only case folding and
/// the model below agree. Wildcard characters are deliberately included.
fn arb_name() -> impl Strategy<Value = String> {
    "[ -~]{1,40}"
}

/// Search strings, including SQL wildcard characters and backslashes.
fn arb_search() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9%_\\\\ ]{0,8}"
}

fn arb_sort() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::ByName), Just(SortOrder::ByDate)]
}

/// Up to a dozen rows of (name, important, completed, `created_ms`).
fn arb_rows() -> impl Strategy<Value = Vec<(String, bool, bool, u64)>> {
    prop::collection::vec((arb_name(), any::<bool>(), any::<bool>(), 0u64..100_000), 0..12)
}

// --- Reference model ---

fn populate(rows: &[(String, bool, bool, u64)]) -> (TaskStore, Vec<Task>) {
    let store = TaskStore::in_memory().expect("in-memory store");
    let mut tasks = Vec::new();
    for (i, (name, important, completed, created_ms)) in rows.iter().enumerate() {
        let task = Task {
            id: TaskId::from_i64(i64::try_from(i).unwrap() + 1),
            name: name.clone(),
            important: *important,
            completed: *completed,
            created_ms: *created_ms,
        };
        store.insert(&task).unwrap();
        tasks.push(task);
    }
    (store, tasks)
}

/// The predicate the WHERE clause is expected to implement.
fn matches(task: &Task, search: &str, hide_completed: bool) -> bool {
    let name = task.name.to_ascii_lowercase();
    name.contains(&search.to_ascii_lowercase()) && !(hide_completed && task.completed)
}

/// The comparator the ORDER BY clause is expected to implement.
fn expected_order(tasks: &mut [Task], sort: SortOrder) {
    tasks.sort_by_key(|t| {
        (
            !t.important,
            match sort {
                SortOrder::ByName => (t.name.to_ascii_lowercase(), 0),
                SortOrder::ByDate => (String::new(), t.created_ms),
            },
            t.id,
        )
    });
}

// --- Properties ---

proptest! {
    #[test]
    fn identical_queries_return_identical_lists(
        rows in arb_rows(),
        search in arb_search(),
        sort in arb_sort(),
        hide in any::<bool>(),
    ) {
        let (store, _) = populate(&rows);
        let filter = TaskFilter::new(search, sort, hide);
        let first = store.query(&filter).unwrap();
        let second = store.query(&filter).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn result_set_matches_reference_predicate(
        rows in arb_rows(),
        search in arb_search(),
        sort in arb_sort(),
        hide in any::<bool>(),
    ) {
        let (store, tasks) = populate(&rows);
        let filter = TaskFilter::new(search.clone(), sort, hide);
        let results = store.query(&filter).unwrap();

        let mut expected: Vec<TaskId> = tasks
            .iter()
            .filter(|t| matches(t, &search, hide))
            .map(|t| t.id)
            .collect();
        let mut actual: Vec<TaskId> = results.iter().map(|t| t.id).collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn result_order_matches_documented_total_order(
        rows in arb_rows(),
        search in arb_search(),
        sort in arb_sort(),
        hide in any::<bool>(),
    ) {
        let (store, tasks) = populate(&rows);
        let filter = TaskFilter::new(search.clone(), sort, hide);
        let results = store.query(&filter).unwrap();

        let mut expected: Vec<Task> = tasks
            .into_iter()
            .filter(|t| matches(t, &search, hide))
            .collect();
        expected_order(&mut expected, sort);
        prop_assert_eq!(results, expected);
    }

    #[test]
    fn hidden_results_never_contain_completed_tasks(
        rows in arb_rows(),
        search in arb_search(),
        sort in arb_sort(),
    ) {
        let (store, _) = populate(&rows);
        let filter = TaskFilter::new(search, sort, true);
        let results = store.query(&filter).unwrap();
        prop_assert!(results.iter().all(|t| !t.completed));
    }
}
