use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use super::mode::TuiState;
use crate::dispatch::key_offset;
use crate::shared::InputEvent;

// poll for terminal input, translating key, mouse and focus events into
// input events for the middle layer. Drains everything already queued so a
// burst of events doesn't lag behind by a frame each.
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    let timeout = match ts.next_up() {
        Some(at) => timeout.min(at.saturating_duration_since(Instant::now())),
        None => timeout,
    };

    if event::poll(timeout)? {
        loop {
            events.extend(translate(event::read()?, ts, Instant::now()));
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
    }

    events.extend(ts.due_ups(Instant::now()).into_iter().map(InputEvent::KeyUp));
    Ok(events)
}

fn translate(event: Event, ts: &mut TuiState, now: Instant) -> Vec<InputEvent> {
    match event {
        Event::Key(key) => handle_key(key, ts, now),
        Event::Mouse(mouse) => handle_mouse(mouse).into_iter().collect(),
        Event::FocusLost => {
            ts.pending_ups.clear(); // the middle layer releases everything
            vec![InputEvent::FocusLost]
        }
        _ => vec![],
    }
}

fn handle_key(key: KeyEvent, ts: &mut TuiState, now: Instant) -> Vec<InputEvent> {
    let piano_code = match key.code {
        KeyCode::Char(c) if key_offset(c.to_ascii_lowercase()).is_some() => {
            Some(c.to_ascii_lowercase())
        }
        _ => None,
    };

    if key.kind == KeyEventKind::Release {
        return piano_code.map(InputEvent::KeyUp).into_iter().collect();
    }

    if let Some(code) = piano_code {
        if !ts.release_reporting {
            ts.hold(code, now);
        }
        // repeats reach the dispatcher, which ignores held keys
        return vec![InputEvent::KeyDown(code)];
    }

    let repeat = key.kind == KeyEventKind::Repeat;
    match key.code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![InputEvent::Quit]
        }
        KeyCode::Left => vec![InputEvent::ShiftWindow(-1)],
        KeyCode::Right => vec![InputEvent::ShiftWindow(1)],
        KeyCode::Char('-') => vec![InputEvent::ResizeWindow(-1)],
        KeyCode::Char('=' | '+') => vec![InputEvent::ResizeWindow(1)],

        // toggles don't auto-repeat
        _ if repeat => vec![],
        KeyCode::Char(' ') => vec![InputEvent::TogglePlay],
        KeyCode::Tab => vec![InputEvent::NextScale],
        KeyCode::Char('l') => vec![InputEvent::Load],
        _ => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent) -> Option<InputEvent> {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::PointerDown { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::PointerMove { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn reporting() -> TuiState {
        TuiState::new(true, Duration::from_millis(250))
    }

    #[test]
    fn test_piano_keys_press_and_release() {
        let mut ts = reporting();
        let now = Instant::now();
        assert_eq!(
            vec![InputEvent::KeyDown('a')],
            handle_key(key(KeyCode::Char('A'), KeyEventKind::Press), &mut ts, now)
        );
        assert_eq!(
            vec![InputEvent::KeyUp('a')],
            handle_key(key(KeyCode::Char('a'), KeyEventKind::Release), &mut ts, now)
        );
        assert!(ts.pending_ups.is_empty());
    }

    #[test]
    fn test_synthetic_release_without_reporting() {
        let mut ts = TuiState::new(false, Duration::from_millis(250));
        let now = Instant::now();
        handle_key(key(KeyCode::Char('s'), KeyEventKind::Press), &mut ts, now);
        assert_eq!(Some(now + Duration::from_millis(250)), ts.next_up());
    }

    #[test]
    fn test_controls() {
        let mut ts = reporting();
        let now = Instant::now();
        let press = |code, ts: &mut TuiState| handle_key(key(code, KeyEventKind::Press), ts, now);
        assert_eq!(vec![InputEvent::Quit], press(KeyCode::Esc, &mut ts));
        assert_eq!(vec![InputEvent::ShiftWindow(-1)], press(KeyCode::Left, &mut ts));
        assert_eq!(vec![InputEvent::ResizeWindow(1)], press(KeyCode::Char('='), &mut ts));
        assert_eq!(vec![InputEvent::TogglePlay], press(KeyCode::Char(' '), &mut ts));
        assert_eq!(vec![InputEvent::Load], press(KeyCode::Char('l'), &mut ts));
        assert!(press(KeyCode::Char('z'), &mut ts).is_empty());

        // held space doesn't toggle over and over; held arrows keep shifting
        assert!(handle_key(key(KeyCode::Char(' '), KeyEventKind::Repeat), &mut ts, now).is_empty());
        assert_eq!(
            vec![InputEvent::ShiftWindow(1)],
            handle_key(key(KeyCode::Right, KeyEventKind::Repeat), &mut ts, now)
        );
        assert!(handle_key(key(KeyCode::Esc, KeyEventKind::Release), &mut ts, now).is_empty());
    }

    #[test]
    fn test_mouse() {
        let mouse = |kind| MouseEvent {
            kind,
            column: 5,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            Some(InputEvent::PointerDown { x: 5, y: 7 }),
            handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left)))
        );
        assert_eq!(
            Some(InputEvent::PointerMove { x: 5, y: 7 }),
            handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left)))
        );
        assert_eq!(
            Some(InputEvent::PointerUp),
            handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left)))
        );
        assert_eq!(None, handle_mouse(mouse(MouseEventKind::Moved)));
    }

    #[test]
    fn test_focus_lost_drops_pending_releases() {
        let mut ts = TuiState::new(false, Duration::from_millis(250));
        let now = Instant::now();
        translate(Event::Key(key(KeyCode::Char('a'), KeyEventKind::Press)), &mut ts, now);
        assert_eq!(vec![InputEvent::FocusLost], translate(Event::FocusLost, &mut ts, now));
        assert!(ts.pending_ups.is_empty());
    }
}
