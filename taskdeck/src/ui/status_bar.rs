//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.mode {
        InputMode::Normal => {
            "a: add | e: edit | d: delete | u: undo | space: done | i: important | /: search | s: sort | h: hide done | q: quit"
        }
        InputMode::Search => "type to filter | Ctrl-U: clear | Esc: back",
        InputMode::Edit => "Enter: save | Tab: important | Esc: cancel",
    };

    let mut spans = vec![
        Span::styled(format!("sort: {}", app.prefs.sort_order), theme::bold()),
        Span::raw(" | "),
    ];
    if app.prefs.hide_completed {
        spans.push(Span::styled("hiding done", theme::bold()));
        spans.push(Span::raw(" | "));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.clone(), theme::highlighted()));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
