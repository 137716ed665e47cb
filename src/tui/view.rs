use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};

use super::keys::draw_keys;
use crate::dispatch::KeyboardArea;
use crate::note::key_to_note;
use crate::shared::{DisplayState, KeyId, LoadState};

const HELP: &str =
    "a-k play  ←/→ shift  -/= size  space play/stop  tab scale  l load  esc quit";

// Draw one frame. Returns where the keys landed so mouse input can be
// hit-tested against them.
pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) -> KeyboardArea {
    let [status, keys, help] = Layout::vertical([
        Constraint::Length(3), // status / progress
        Constraint::Min(6),    // keyboard
        Constraint::Length(1), // help line
    ])
    .areas(area);

    draw_status(frame, status, state);
    let keyboard = draw_keys(frame, keys, state);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        help,
    );
    keyboard
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let block = Block::bordered().title(" pianotty ");

    if state.playing {
        let name = state.song_name.as_deref().unwrap_or("song");
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(state.progress.clamp(0.0, 1.0) as f64)
            .label(format!("{name}  {:.0}%", state.progress * 100.0));
        frame.render_widget(gauge, area);
        return;
    }

    let end = KeyId(state.start.0 + state.visible.saturating_sub(1));
    let load_style = match state.load_state {
        LoadState::Ready => Style::default().fg(Color::Green),
        LoadState::Failed(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    };
    let load_text = match &state.load_state {
        LoadState::Failed(reason) => format!("{}: {reason}", state.load_state.label()),
        other => other.label().to_string(),
    };
    let line = Line::from(vec![
        Span::raw(format!(
            "{}..{} ({} keys)   scale: {}   ",
            key_to_note(state.start),
            key_to_note(end),
            state.visible,
            state.scale_name
        )),
        Span::styled(load_text, load_style),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
