//! Persisted filter preferences.
//!
//! Sort order and the hide-completed flag survive restarts in a small
//! TOML file. Updates are fire-and-forget: the in-memory watch channel
//! is updated first so the UI reacts immediately, then the file write
//! happens on a best-effort basis. A failed write is logged and the
//! session continues with the in-memory value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use taskdeck_core::SortOrder;

/// The user's current view preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPrefs {
    /// How the task list is ordered.
    pub sort_order: SortOrder,
    /// Whether completed tasks are hidden from the list.
    pub hide_completed: bool,
}

/// On-disk shape of the preferences file. Every field is optional so a
/// hand-edited partial file still loads.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hide_completed: Option<bool>,
}

impl PrefsFile {
    fn into_prefs(self) -> FilterPrefs {
        FilterPrefs {
            sort_order: self.sort_order.unwrap_or_default(),
            hide_completed: self.hide_completed.unwrap_or_default(),
        }
    }

    fn from_prefs(prefs: FilterPrefs) -> Self {
        Self {
            sort_order: Some(prefs.sort_order),
            hide_completed: Some(prefs.hide_completed),
        }
    }
}

/// Owns the preferences watch channel and the backing file.
pub struct PrefsManager {
    path: PathBuf,
    tx: watch::Sender<FilterPrefs>,
}

impl PrefsManager {
    /// Loads preferences from `path`, falling back to defaults when the
    /// file is missing or unreadable. A malformed file is reported but
    /// never fatal.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let prefs = read_prefs(&path);
        let (tx, _) = watch::channel(prefs);
        Self { path, tx }
    }

    /// A watch over the current preferences.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilterPrefs> {
        self.tx.subscribe()
    }

    /// The current in-memory preferences.
    #[must_use]
    pub fn current(&self) -> FilterPrefs {
        *self.tx.borrow()
    }

    /// Updates the sort order and persists.
    pub fn set_sort_order(&self, sort_order: SortOrder) {
        self.apply(|p| p.sort_order = sort_order);
    }

    /// Updates the hide-completed flag and persists.
    pub fn set_hide_completed(&self, hide_completed: bool) {
        self.apply(|p| p.hide_completed = hide_completed);
    }

    fn apply(&self, f: impl FnOnce(&mut FilterPrefs)) {
        self.tx.send_modify(f);
        self.persist();
    }

    fn persist(&self) {
        let prefs = *self.tx.borrow();
        if let Err(e) = write_prefs(&self.path, prefs) {
            warn!(path = %self.path.display(), error = %e, "failed to persist preferences");
        } else {
            debug!(path = %self.path.display(), ?prefs, "preferences saved");
        }
    }
}

fn read_prefs(path: &Path) -> FilterPrefs {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no preferences file, using defaults");
            return FilterPrefs::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read preferences, using defaults");
            return FilterPrefs::default();
        }
    };
    match toml::from_str::<PrefsFile>(&contents) {
        Ok(file) => file.into_prefs(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed preferences file, using defaults");
            FilterPrefs::default()
        }
    }
}

fn write_prefs(path: &Path, prefs: FilterPrefs) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = PrefsFile::from_prefs(prefs);
    let contents = toml::to_string_pretty(&file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, contents)
}
