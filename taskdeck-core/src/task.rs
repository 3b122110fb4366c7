//! The task data model.
//!
//! A [`Task`] is one row of the local task table. Identity is the SQLite
//! rowid: assigned once at creation, unique, and never reused. The
//! creation timestamp is immutable; every other field can be edited in
//! place without changing identity.

use serde::{Deserialize, Serialize};

/// Maximum allowed task name length in characters.
pub const MAX_TASK_NAME_LENGTH: usize = 256;

/// Unique identifier for a task (the SQLite rowid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(i64);

impl TaskId {
    /// Wraps an existing rowid.
    #[must_use]
    pub const fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner rowid value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the task list is ordered.
///
/// Important tasks always sort first; the sort order picks the secondary
/// key within each importance group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Alphabetical by name, case-insensitive.
    ByName,
    /// Oldest first by creation timestamp.
    #[default]
    ByDate,
}

impl SortOrder {
    /// Returns the other sort order.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::ByName => Self::ByDate,
            Self::ByDate => Self::ByName,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName => write!(f, "name"),
            Self::ByDate => write!(f, "date created"),
        }
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the store at creation.
    pub id: TaskId,
    /// Task name as entered by the user.
    pub name: String,
    /// Important tasks sort before everything else.
    pub important: bool,
    /// Whether the task has been checked off.
    pub completed: bool,
    /// When the task was created (milliseconds since epoch, immutable).
    pub created_ms: u64,
}

impl Task {
    /// Returns a copy with `completed` replaced.
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// Returns a copy with `important` replaced.
    #[must_use]
    pub fn with_important(&self, important: bool) -> Self {
        Self {
            important,
            ..self.clone()
        }
    }
}

/// Demo rows seeded into a fresh database: `(name, important, completed)`.
///
/// The duplicate name is intentional; names are not unique, only ids are.
pub const DEMO_TASKS: [(&str, bool, bool); 6] = [
    ("Wash the dishes", false, false),
    ("Do the laundry", false, false),
    ("Buy groceries", true, false),
    ("Prepare food", false, true),
    ("Call mom", false, true),
    ("Wash the dishes", false, false),
];
