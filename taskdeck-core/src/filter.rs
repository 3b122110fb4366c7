//! Filter state for the task list query.
//!
//! A [`TaskFilter`] is the tuple of (search text, sort order,
//! hide-completed) that selects one concrete SQL query. The store turns
//! it into a WHERE/ORDER BY pair; the composer in the application crate
//! rebuilds it whenever any of the three inputs changes.

use serde::{Deserialize, Serialize};

use crate::task::SortOrder;

/// A search/sort/hide-completed combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring matched against task names.
    /// Empty matches everything.
    pub search: String,
    /// Secondary ordering within each importance group.
    pub sort: SortOrder,
    /// When set, completed tasks are excluded.
    pub hide_completed: bool,
}

impl TaskFilter {
    /// Builds a filter from its three parts.
    #[must_use]
    pub const fn new(search: String, sort: SortOrder, hide_completed: bool) -> Self {
        Self {
            search,
            sort,
            hide_completed,
        }
    }

    /// The `LIKE` pattern for the search text, with SQL wildcards escaped
    /// so user input is always matched literally. Used with `ESCAPE '\'`.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let escaped = self
            .search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    /// The ORDER BY clause for this filter.
    ///
    /// Important tasks first in both modes; the trailing `id` key makes
    /// the order total, so identical queries against an unchanged table
    /// always return the same list.
    #[must_use]
    pub const fn order_clause(&self) -> &'static str {
        match self.sort {
            SortOrder::ByName => "important DESC, name COLLATE NOCASE ASC, id ASC",
            SortOrder::ByDate => "important DESC, created_ms ASC, id ASC",
        }
    }
}
