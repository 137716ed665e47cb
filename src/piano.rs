use std::collections::BTreeMap;

use crossbeam_channel::Receiver;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::events::{EventBus, PianoEvent};
use crate::instrument::Instrument;
use crate::note::{ScalePreset, key_to_note};
use crate::shared::{KeyId, LoadState};
use crate::window::KeyWindow;

/// The piano's mutable state: which keys sound, which are visible, and the
/// instrument that makes the sound. Every press and release from every input
/// source and from song playback goes through here, so the active set and
/// the instrument never disagree.
pub struct Piano {
    instrument: Box<dyn Instrument>,
    active: BTreeMap<KeyId, f32>,
    window: KeyWindow,
    suggested: Vec<KeyId>,
    default_velocity: f32,
    scripted_out_of_window: bool,
    events: EventBus,
}

impl Piano {
    pub fn new(instrument: Box<dyn Instrument>, config: &Config) -> Self {
        let keyboard = &config.keyboard;
        Self {
            instrument,
            active: BTreeMap::new(),
            window: KeyWindow::new(
                keyboard.start_key,
                keyboard.visible_keys,
                keyboard.min_visible,
                keyboard.max_visible,
            ),
            suggested: Vec::new(),
            default_velocity: keyboard.default_velocity.clamp(0.0, 1.0),
            scripted_out_of_window: config.playback.out_of_window,
            events: EventBus::default(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<PianoEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&mut self, event: PianoEvent) {
        self.events.publish(event);
    }

    // -- instrument lifecycle --

    pub fn load_state(&self) -> &LoadState {
        self.instrument.state()
    }

    pub fn is_ready(&self) -> bool {
        self.instrument.state().is_ready()
    }

    pub fn load(&mut self) {
        let before = self.instrument.state().clone();
        self.instrument.load();
        let after = self.instrument.state().clone();
        if after != before {
            self.publish(PianoEvent::LoadStateChanged(after));
        }
    }

    /// Pick up a finished background load. Becoming ready also seeds the
    /// suggested keys with the default scale.
    pub fn poll(&mut self) {
        let Some(state) = self.instrument.poll() else {
            return;
        };
        let ready = state.is_ready();
        self.publish(PianoEvent::LoadStateChanged(state));
        if ready {
            self.set_suggested_keys(ScalePreset::default().keys());
        }
    }

    // -- active notes --

    pub fn default_velocity(&self) -> f32 {
        self.default_velocity
    }

    /// Start a note the user played. Dropped unless the instrument is ready
    /// and the key is visible. Pressing a key that already sounds only
    /// updates its velocity.
    pub fn press(&mut self, key: KeyId, velocity: f32) -> bool {
        if !self.window.contains(key) {
            trace!(key = key.0, "Ignoring press outside the window");
            return false;
        }
        self.press_unchecked(key, velocity)
    }

    /// Start a note from song playback, which may reach outside the window.
    pub fn press_scripted(&mut self, key: KeyId, velocity: f32) -> bool {
        if self.scripted_out_of_window {
            self.press_unchecked(key, velocity)
        } else {
            self.press(key, velocity)
        }
    }

    fn press_unchecked(&mut self, key: KeyId, velocity: f32) -> bool {
        if !self.is_ready() {
            trace!(key = key.0, "Ignoring press, instrument not ready");
            return false;
        }
        let velocity = velocity.clamp(0.0, 1.0);
        if self.active.insert(key, velocity).is_none() {
            self.instrument.attack(&key_to_note(key), velocity);
        }
        self.publish(PianoEvent::KeyPressed { key, velocity });
        true
    }

    pub fn release(&mut self, key: KeyId) -> bool {
        if self.active.remove(&key).is_none() {
            return false;
        }
        self.instrument.release(&key_to_note(key));
        self.publish(PianoEvent::KeyReleased { key });
        true
    }

    /// Silence everything. Voices still get their release tail.
    pub fn clear(&mut self) {
        if self.active.is_empty() {
            return;
        }
        debug!(keys = self.active.len(), "Releasing all keys");
        self.active.clear();
        self.instrument.release_all();
        self.publish(PianoEvent::AllReleased);
    }

    #[cfg(test)]
    pub fn is_active(&self, key: KeyId) -> bool {
        self.active.contains_key(&key)
    }

    #[cfg(test)]
    pub fn velocity(&self, key: KeyId) -> Option<f32> {
        self.active.get(&key).copied()
    }

    pub fn active_keys(&self) -> impl Iterator<Item = (KeyId, f32)> + '_ {
        self.active.iter().map(|(k, v)| (*k, *v))
    }

    // -- window --

    pub fn window(&self) -> &KeyWindow {
        &self.window
    }

    pub fn set_start(&mut self, start: i32) -> bool {
        let changed = self.window.set_start(start);
        self.window_changed(changed)
    }

    pub fn set_visible_count(&mut self, count: i32) -> bool {
        let changed = self.window.set_visible_count(count);
        self.window_changed(changed)
    }

    pub fn center_on(&mut self, center: i32) -> bool {
        let changed = self.window.center_on(center);
        self.window_changed(changed)
    }

    fn window_changed(&mut self, changed: bool) -> bool {
        if changed {
            let (start, count) = (self.window.start(), self.window.count());
            debug!(start = start.0, count, "Window changed");
            self.publish(PianoEvent::WindowChanged { start, count });
        }
        changed
    }

    // -- suggestions --

    pub fn suggested_keys(&self) -> &[KeyId] {
        &self.suggested
    }

    pub fn set_suggested_keys(&mut self, keys: Vec<KeyId>) {
        if keys == self.suggested {
            return;
        }
        info!(keys = ?keys, "Suggested keys changed");
        self.suggested = keys.clone();
        self.publish(PianoEvent::SuggestedKeysChanged(keys));
    }
}
