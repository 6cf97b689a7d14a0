//! Chat area
//!
//! Displays the room log, newest at the bottom.

use huddle_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = app.room().map_or_else(
        || " No Room ".to_string(),
        |room| format!(" #{} as {} ", room.room_id, room.display_name),
    );

    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = app.room().map_or_else(
        || {
            vec![ListItem::new(Line::from(Span::styled(
                "Type /join <room> [name] to start chatting",
                Style::default().fg(Color::DarkGray),
            )))]
        },
        |room| {
            room.messages
                .iter()
                .map(|msg| {
                    let own = msg.author == room.display_name;
                    let color = if own { Color::Cyan } else { Color::Green };

                    ListItem::new(Line::from(vec![
                        Span::styled(
                            msg.author.clone(),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" ({})", msg.timestamp),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(": "),
                        Span::raw(msg.body.clone()),
                    ]))
                })
                .collect()
        },
    );

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}
