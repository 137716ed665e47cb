use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use crate::piano::Piano;
use crate::shared::{InputEvent, KeyId};
use crate::window::KeyWindow;

// Physical keys, as offsets from the window's left edge. Two rows laid out
// like a piano: white keys on the home row, black keys above them.
const KEY_MAP: [(char, i32); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

pub fn key_offset(code: char) -> Option<i32> {
    KEY_MAP.iter().find(|(c, _)| *c == code).map(|(_, o)| *o)
}

pub fn shortcut_for_offset(offset: i32) -> Option<char> {
    KEY_MAP.iter().find(|(_, o)| *o == offset).map(|(c, _)| *c)
}

/// Where the keys were last drawn, in terminal cells. Each visible key gets
/// an equal share of the width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl KeyboardArea {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x
            && x < self.x.saturating_add(self.width)
            && y >= self.y
            && y < self.y.saturating_add(self.height)
    }

    pub fn key_at(&self, x: u16, y: u16, window: &KeyWindow) -> Option<KeyId> {
        if !self.contains(x, y) {
            return None;
        }
        let offset = (x - self.x) as i32 * window.count() as i32 / self.width as i32;
        window.key_at_offset(offset)
    }

    /// Columns of the `index`th visible key, as (x, width). Consistent with
    /// `key_at`, so what is drawn is what gets hit.
    pub fn column_span(&self, index: u16, count: u8) -> (u16, u16) {
        let width = self.width as u32;
        let count = count.max(1) as u32;
        let from = (index as u32 * width).div_ceil(count);
        let to = ((index as u32 + 1) * width).div_ceil(count);
        (self.x + from as u16, (to - from) as u16)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pointer {
    Up,
    Down(Option<KeyId>), // held key, None while off the keyboard
}

/// Turns raw input into piano presses and releases. Each source (keyboard
/// code, the mouse button, each touch id) is its own UP/DOWN state machine,
/// so releases always go to the key that source actually pressed.
pub struct Dispatcher {
    area: KeyboardArea,
    held_codes: HashMap<char, KeyId>,
    pointer: Pointer,
    touches: HashMap<u64, Option<KeyId>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            area: KeyboardArea::default(),
            held_codes: HashMap::new(),
            pointer: Pointer::Up,
            touches: HashMap::new(),
        }
    }

    pub fn set_area(&mut self, area: KeyboardArea) {
        self.area = area;
    }

    pub fn handle(&mut self, event: InputEvent, piano: &mut Piano) {
        match event {
            InputEvent::KeyDown(code) => self.key_down(code.to_ascii_lowercase(), piano),
            InputEvent::KeyUp(code) => {
                if let Some(key) = self.held_codes.remove(&code.to_ascii_lowercase()) {
                    self.release_unless_held(key, piano);
                }
            }
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y, piano),
            InputEvent::PointerMove { x, y } => {
                if let Pointer::Down(current) = self.pointer {
                    let next = self.area.key_at(x, y, piano.window());
                    self.pointer = Pointer::Down(next);
                    self.glide(current, next, piano);
                }
            }
            InputEvent::PointerUp => {
                if let Pointer::Down(current) = self.pointer {
                    self.pointer = Pointer::Up;
                    if let Some(key) = current {
                        self.release_unless_held(key, piano);
                    }
                }
            }
            InputEvent::TouchStart { id, x, y } => self.touch_start(id, x, y, piano),
            InputEvent::TouchMove { id, x, y } => {
                if let Some(current) = self.touches.get(&id).copied() {
                    let next = self.area.key_at(x, y, piano.window());
                    self.touches.insert(id, next);
                    self.glide(current, next, piano);
                }
            }
            InputEvent::TouchEnd { id } | InputEvent::TouchCancel { id } => {
                if let Some(Some(key)) = self.touches.remove(&id) {
                    self.release_unless_held(key, piano);
                }
            }
            InputEvent::FocusLost => self.release_all(piano),
            other => trace!(event = ?other, "Not an input source event"),
        }
    }

    fn key_down(&mut self, code: char, piano: &mut Piano) {
        if self.held_codes.contains_key(&code) {
            return; // auto-repeat
        }
        let Some(offset) = key_offset(code) else {
            return;
        };
        let Some(key) = piano.window().key_at_offset(offset) else {
            trace!(code = %code, offset, "Key resolves off the keyboard");
            return;
        };
        // remember the absolute key so the release lands even if the window moves
        self.held_codes.insert(code, key);
        piano.press(key, piano.default_velocity());
    }

    fn pointer_down(&mut self, x: u16, y: u16, piano: &mut Piano) {
        // a missed button-up leaves the old session open
        if let Pointer::Down(Some(key)) = self.pointer {
            self.pointer = Pointer::Up;
            self.release_unless_held(key, piano);
        }
        let Some(key) = self.area.key_at(x, y, piano.window()) else {
            self.pointer = Pointer::Up;
            return;
        };
        self.pointer = Pointer::Down(Some(key));
        piano.press(key, piano.default_velocity());
    }

    fn touch_start(&mut self, id: u64, x: u16, y: u16, piano: &mut Piano) {
        if let Some(Some(key)) = self.touches.remove(&id) {
            self.release_unless_held(key, piano);
        }
        let Some(key) = self.area.key_at(x, y, piano.window()) else {
            return;
        };
        self.touches.insert(id, Some(key));
        piano.press(key, piano.default_velocity());
    }

    // the source's registry entry must already point at `to`
    fn glide(&mut self, from: Option<KeyId>, to: Option<KeyId>, piano: &mut Piano) {
        if from == to {
            return;
        }
        if let Some(key) = from {
            self.release_unless_held(key, piano);
        }
        if let Some(key) = to {
            piano.press(key, piano.default_velocity());
        }
    }

    // Two sources can hold the same key; it sounds until the last lets go.
    fn release_unless_held(&self, key: KeyId, piano: &mut Piano) {
        if !self.held_keys().contains(&key) {
            piano.release(key);
        }
    }

    fn held_keys(&self) -> BTreeSet<KeyId> {
        let pointer = match self.pointer {
            Pointer::Down(key) => key,
            Pointer::Up => None,
        };
        self.held_codes
            .values()
            .copied()
            .chain(pointer)
            .chain(self.touches.values().flatten().copied())
            .collect()
    }

    /// Release every key any source holds and forget all sources.
    pub fn release_all(&mut self, piano: &mut Piano) {
        let held = self.held_keys();
        self.reset();
        for key in held {
            piano.release(key);
        }
    }

    /// Forget all sources without releasing; for when the piano was already
    /// cleared.
    pub fn reset(&mut self) {
        self.held_codes.clear();
        self.pointer = Pointer::Up;
        self.touches.clear();
    }
}
