//! Task model and SQLite persistence for `taskdeck`.
//!
//! This crate holds everything that does not depend on a terminal or an
//! async runtime: the [`Task`] data model, the [`TaskFilter`] describing
//! a search/sort/hide-completed combination, and the [`TaskStore`]
//! backed by a local SQLite table.

pub mod filter;
pub mod store;
pub mod task;

pub use filter::TaskFilter;
pub use store::{StoreError, TaskStore};
pub use task::{MAX_TASK_NAME_LENGTH, SortOrder, Task, TaskId};
