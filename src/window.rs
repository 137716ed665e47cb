// The visible/playable slice of the keyboard. Every setter re-clamps both
// fields, so the window can never run off either end of the 88 keys.

use crate::shared::{KeyId, NUM_KEYS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyWindow {
    start: u8,
    count: u8,
    min_count: u8,
    max_count: u8,
}

impl KeyWindow {
    /// `min_count`/`max_count` are the UI limits for the visible key count;
    /// they are themselves clamped to 1..=88.
    pub fn new(start: i32, count: i32, min_count: u8, max_count: u8) -> Self {
        let max_count = max_count.clamp(1, NUM_KEYS as u8);
        let min_count = min_count.clamp(1, max_count);
        let mut window = Self {
            start: 0,
            count: min_count,
            min_count,
            max_count,
        };
        window.set_visible_count(count);
        window.set_start(start);
        window
    }

    pub fn start(&self) -> KeyId {
        KeyId(self.start)
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Last visible key, inclusive.
    pub fn end(&self) -> KeyId {
        KeyId(self.start + self.count - 1)
    }

    pub fn contains(&self, key: KeyId) -> bool {
        key.0 >= self.start && key.0 <= self.end().0
    }

    /// Key at `offset` from the window start, if it lands on the keyboard.
    /// The offset may point past the window's right edge.
    pub fn key_at_offset(&self, offset: i32) -> Option<KeyId> {
        KeyId::new(self.start as i32 + offset)
    }

    fn max_start(&self) -> i32 {
        NUM_KEYS as i32 - self.count as i32
    }

    /// Returns true when the window moved.
    pub fn set_start(&mut self, start: i32) -> bool {
        let start = start.clamp(0, self.max_start()) as u8;
        let changed = start != self.start;
        self.start = start;
        changed
    }

    pub fn clamp_count(&self, count: i32) -> i32 {
        count.clamp(self.min_count as i32, self.max_count as i32)
    }

    /// Returns true when the count or the start changed.
    pub fn set_visible_count(&mut self, count: i32) -> bool {
        let count = self.clamp_count(count) as u8;
        let changed = count != self.count;
        self.count = count;
        // keep the start, but pull it back if the window now runs off the end
        let start = self.start as i32;
        self.set_start(start) || changed
    }

    /// Put `center` in the middle of the window (as far as the ends allow).
    pub fn center_on(&mut self, center: i32) -> bool {
        self.set_start(center - self.count as i32 / 2)
    }
}
