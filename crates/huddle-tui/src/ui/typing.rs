//! Typing indicator line.

use huddle_app::{App, RoomView};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};

/// Render who is typing, or nothing.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.room().and_then(RoomView::typing_summary) else {
        return;
    };

    let paragraph = Paragraph::new(format!(" {summary}"))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC));

    frame.render_widget(paragraph, area);
}
