//! Add/edit popup rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme;
use crate::app::App;

/// Render the add/edit popup over the task list.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.editor.target.is_some() {
        " Edit Task "
    } else {
        " New Task "
    };

    let block = Block::default()
        .title(title)
        .title_style(theme::panel_title(theme::EDITOR_TITLE))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());
    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let name_line = Line::from(vec![
        Span::styled("Name: ", theme::bold()),
        Span::styled(app.editor.name.as_str(), theme::normal()),
    ]);
    frame.render_widget(Paragraph::new(name_line), rows[0]);

    let important = if app.editor.important { "yes" } else { "no" };
    let flag_line = Line::from(vec![
        Span::styled("Important: ", theme::bold()),
        Span::styled(important, theme::important()),
        Span::styled("  (Tab to toggle, Enter to save, Esc to cancel)", theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(flag_line), rows[1]);

    // Cursor sits inside the name field.
    let cursor_chars = app.editor.name[..app.editor.cursor].chars().count();
    let x = rows[0].x + 6 + u16::try_from(cursor_chars).unwrap_or(u16::MAX - 1);
    frame.set_cursor_position((x.min(rows[0].right().saturating_sub(1)), rows[0].y));
}
