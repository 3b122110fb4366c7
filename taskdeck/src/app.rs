//! Application state and event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskdeck_core::{SortOrder, Task};

use crate::prefs::FilterPrefs;

/// Which input mode the UI is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Browsing the task list (default).
    Normal,
    /// Typing into the search bar.
    Search,
    /// The add/edit popup is open.
    Edit,
}

/// Side effects requested by a key press, executed by the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Create a new task.
    Create {
        /// Task name as entered.
        name: String,
        /// Whether the task is marked important.
        important: bool,
    },
    /// Save edits to an existing task.
    Update(Task),
    /// Delete a task (undo state is retained in the app).
    Delete(Task),
    /// Re-insert a previously deleted task verbatim.
    Restore(Task),
    /// The search text changed.
    SearchChanged(String),
    /// The sort order preference changed.
    SortOrderChanged(SortOrder),
    /// The hide-completed preference changed.
    HideCompletedChanged(bool),
    /// Quit the application.
    Quit,
}

/// State of the add/edit popup.
#[derive(Debug, Default)]
pub struct Editor {
    /// Task being edited, `None` when adding a new one.
    pub target: Option<Task>,
    /// Name buffer.
    pub name: String,
    /// Cursor position in the name buffer (byte index).
    pub cursor: usize,
    /// Important flag for the task being edited.
    pub important: bool,
}

/// Main application state.
pub struct App {
    /// Current input mode.
    pub mode: InputMode,
    /// Tasks currently shown, as delivered by the live query.
    pub tasks: Vec<Task>,
    /// Selected task index into `tasks`.
    pub selected: usize,
    /// Current search text.
    pub search: String,
    /// Mirror of the current filter preferences, for display.
    pub prefs: FilterPrefs,
    /// Add/edit popup state.
    pub editor: Editor,
    /// Last deleted task, available for undo.
    pub pending_undo: Option<Task>,
    /// Status line message.
    pub status: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Maximum task name length accepted by the editor.
    pub max_task_name_len: usize,
    /// Chrono format string for created timestamps.
    pub timestamp_format: String,
}

impl App {
    /// Create a new application in normal mode with an empty list.
    #[must_use]
    pub fn new(prefs: FilterPrefs, max_task_name_len: usize, timestamp_format: String) -> Self {
        Self {
            mode: InputMode::Normal,
            tasks: Vec::new(),
            selected: 0,
            search: String::new(),
            prefs,
            editor: Editor::default(),
            pending_undo: None,
            status: None,
            should_quit: false,
            max_task_name_len,
            timestamp_format,
        }
    }

    /// Replace the displayed task list with a fresh query result.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        if self.selected >= self.tasks.len() {
            self.selected = self.tasks.len().saturating_sub(1);
        }
    }

    /// The currently selected task, if any.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    /// Handle a key event, returning the action the main loop should run.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(AppAction::Quit);
        }

        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::Edit => self.handle_edit_key(key),
        }
    }

    /// Handle key event in normal (list browsing) mode.
    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(AppAction::Quit)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                None
            }
            KeyCode::Char(' ') => self.toggle_completed(),
            KeyCode::Char('i') => self.toggle_important(),
            KeyCode::Char('a') => {
                self.open_editor(None);
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let target = self.selected_task().cloned();
                if let Some(task) = target {
                    self.open_editor(Some(task));
                }
                None
            }
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('u') => self.undo_delete(),
            KeyCode::Char('/') => {
                self.mode = InputMode::Search;
                None
            }
            KeyCode::Char('s') => {
                let next = self.prefs.sort_order.toggled();
                self.prefs.sort_order = next;
                Some(AppAction::SortOrderChanged(next))
            }
            KeyCode::Char('h') => {
                let next = !self.prefs.hide_completed;
                self.prefs.hide_completed = next;
                Some(AppAction::HideCompletedChanged(next))
            }
            _ => None,
        }
    }

    /// Handle key event while the search bar is focused.
    ///
    /// Every edit fires immediately; the live query picks it up and the
    /// list narrows as the user types.
    fn handle_search_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.search.clear();
                Some(AppAction::SearchChanged(self.search.clone()))
            }
            (KeyCode::Esc | KeyCode::Enter, _) => {
                // The query stays active; Esc just returns focus.
                self.mode = InputMode::Normal;
                None
            }
            (KeyCode::Char(c), _) => {
                self.search.push(c);
                Some(AppAction::SearchChanged(self.search.clone()))
            }
            (KeyCode::Backspace, _) => {
                self.search.pop();
                Some(AppAction::SearchChanged(self.search.clone()))
            }
            _ => None,
        }
    }

    /// Handle key event while the add/edit popup is open.
    fn handle_edit_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.editor = Editor::default();
                None
            }
            KeyCode::Enter => self.submit_editor(),
            KeyCode::Tab => {
                self.editor.important = !self.editor.important;
                None
            }
            KeyCode::Char(c) => {
                if self.editor.name.chars().count() < self.max_task_name_len {
                    self.editor.name.insert(self.editor.cursor, c);
                    self.editor.cursor += c.len_utf8();
                }
                None
            }
            KeyCode::Backspace => {
                if self.editor.cursor > 0 {
                    let prev = prev_char_boundary(&self.editor.name, self.editor.cursor);
                    self.editor.name.remove(prev);
                    self.editor.cursor = prev;
                }
                None
            }
            KeyCode::Left => {
                if self.editor.cursor > 0 {
                    self.editor.cursor = prev_char_boundary(&self.editor.name, self.editor.cursor);
                }
                None
            }
            KeyCode::Right => {
                if self.editor.cursor < self.editor.name.len() {
                    self.editor.cursor = next_char_boundary(&self.editor.name, self.editor.cursor);
                }
                None
            }
            KeyCode::Home => {
                self.editor.cursor = 0;
                None
            }
            KeyCode::End => {
                self.editor.cursor = self.editor.name.len();
                None
            }
            _ => None,
        }
    }

    /// Toggle the completed flag of the selected task.
    fn toggle_completed(&mut self) -> Option<AppAction> {
        let task = self.selected_task()?;
        let updated = task.with_completed(!task.completed);
        Some(AppAction::Update(updated))
    }

    /// Toggle the important flag of the selected task.
    fn toggle_important(&mut self) -> Option<AppAction> {
        let task = self.selected_task()?;
        let updated = task.with_important(!task.important);
        Some(AppAction::Update(updated))
    }

    /// Delete the selected task, retaining it for undo.
    fn delete_selected(&mut self) -> Option<AppAction> {
        let task = self.selected_task()?.clone();
        self.pending_undo = Some(task.clone());
        self.status = Some("Task deleted (press u to undo)".to_string());
        Some(AppAction::Delete(task))
    }

    /// Re-insert the last deleted task exactly as it was.
    fn undo_delete(&mut self) -> Option<AppAction> {
        let task = self.pending_undo.take()?;
        self.status = Some("Task restored".to_string());
        Some(AppAction::Restore(task))
    }

    /// Open the add/edit popup.
    fn open_editor(&mut self, target: Option<Task>) {
        self.editor = match target {
            Some(task) => Editor {
                name: task.name.clone(),
                cursor: task.name.len(),
                important: task.important,
                target: Some(task),
            },
            None => Editor::default(),
        };
        self.mode = InputMode::Edit;
    }

    /// Validate and submit the editor contents.
    fn submit_editor(&mut self) -> Option<AppAction> {
        if self.editor.name.trim().is_empty() {
            self.status = Some("Name cannot be empty".to_string());
            return None;
        }

        let editor = std::mem::take(&mut self.editor);
        self.mode = InputMode::Normal;

        match editor.target {
            Some(mut task) => {
                task.name = editor.name;
                task.important = editor.important;
                self.status = Some("Task updated".to_string());
                Some(AppAction::Update(task))
            }
            None => {
                self.status = Some("Task added".to_string());
                Some(AppAction::Create {
                    name: editor.name,
                    important: editor.important,
                })
            }
        }
    }

    /// Select the previous task, wrapping at the top.
    fn select_prev(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.tasks.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// Select the next task, wrapping at the bottom.
    fn select_next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tasks.len();
    }
}

/// Byte index of the character boundary before `idx`.
fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}

/// Byte index of the character boundary after `idx`.
fn next_char_boundary(s: &str, idx: usize) -> usize {
    s[idx..]
        .chars()
        .next()
        .map_or(idx, |c| idx + c.len_utf8())
}
