use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::dispatch::{KeyboardArea, shortcut_for_offset};
use crate::note::{is_black_key, key_to_note};
use crate::shared::{DisplayState, KeyId};

// one column per visible key, laid out with the same arithmetic the
// dispatcher hit-tests with
pub fn draw_keys(frame: &mut Frame, area: Rect, state: &DisplayState) -> KeyboardArea {
    let keyboard = KeyboardArea {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height,
    };

    for i in 0..state.visible {
        let key = KeyId(state.start.0 + i);
        let (x, width) = keyboard.column_span(i as u16, state.visible);
        if width == 0 {
            continue;
        }
        let cell = Rect::new(x, area.y, width, area.height);

        let style = key_style(key, state);
        let mut block = Block::default().style(style);
        if width > 2 {
            block = block
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(Color::DarkGray));
        }
        let paragraph = Paragraph::new(key_lines(key, i, area.height, state))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, cell);
    }
    keyboard
}

fn key_style(key: KeyId, state: &DisplayState) -> Style {
    if state.is_active(key) {
        return Style::default()
            .fg(Color::Black)
            .bg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD);
    }
    if is_black_key(key) {
        Style::default().fg(Color::Gray).bg(Color::Black)
    } else {
        Style::default().fg(Color::Black).bg(Color::White)
    }
}

// shortcut on top, note name at the bottom, a dot above it for suggested keys
fn key_lines(key: KeyId, offset: u8, height: u16, state: &DisplayState) -> Vec<Line<'static>> {
    let shortcut = shortcut_for_offset(offset as i32)
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default();
    let mut lines = vec![Line::from(shortcut)];

    let body = (height as usize).saturating_sub(3);
    lines.extend(std::iter::repeat_n(Line::default(), body));

    let marker = if state.is_suggested(key) { "•" } else { "" };
    lines.push(Line::from(Span::styled(
        marker,
        Style::default().fg(Color::Blue),
    )));
    lines.push(Line::from(key_to_note(key)));
    lines
}
