//! Search bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, InputMode};

/// Render the search bar at the top of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.mode == InputMode::Search;
    let border_style = if focused {
        theme::highlighted()
    } else {
        theme::normal()
    };

    let block = Block::default()
        .title("Search")
        .title_style(theme::panel_title(theme::SEARCH_TITLE))
        .borders(Borders::ALL)
        .border_style(border_style);

    let paragraph = Paragraph::new(app.search.as_str())
        .style(theme::normal())
        .block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let x = area.x + 1 + u16::try_from(app.search.chars().count()).unwrap_or(u16::MAX - 1);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}
