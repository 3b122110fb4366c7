//! Task list rendering.

use chrono::TimeZone;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use taskdeck_core::Task;

use super::theme;
use crate::app::{App, InputMode};

/// Render the task list panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| ListItem::new(task_line(task, &app.timestamp_format)))
        .collect();

    let title = format!(" Tasks ({}) ", app.tasks.len());
    let border_style = if app.mode == InputMode::Normal {
        theme::highlighted()
    } else {
        theme::normal()
    };

    let block = Block::default()
        .title(title)
        .title_style(theme::panel_title(theme::LIST_TITLE))
        .borders(Borders::ALL)
        .border_style(border_style);

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::selected());

    let mut state = ListState::default();
    if !app.tasks.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// One display line for a task row.
fn task_line<'a>(task: &'a Task, timestamp_format: &str) -> Line<'a> {
    let checkbox = if task.completed { "[\u{2713}]" } else { "[ ]" };
    let marker = if task.important { "\u{2605} " } else { "  " };
    let name_style = if task.completed {
        theme::completed()
    } else {
        theme::normal()
    };

    Line::from(vec![
        Span::styled(checkbox, name_style),
        Span::raw(" "),
        Span::styled(marker, theme::important()),
        Span::styled(task.name.as_str(), name_style),
        Span::raw("  "),
        Span::styled(
            format_created(task.created_ms, timestamp_format),
            theme::timestamp(),
        ),
    ])
}

/// Format a creation timestamp for display.
fn format_created(created_ms: u64, format: &str) -> String {
    i64::try_from(created_ms)
        .ok()
        .and_then(|ms| chrono::Local.timestamp_millis_opt(ms).single())
        .map_or_else(|| "?".to_string(), |dt| dt.format(format).to_string())
}
