use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::{debug, info};

use crate::config::Config;
use crate::debounce::Debounced;
use crate::dispatch::{Dispatcher, KeyboardArea};
use crate::events::PianoEvent;
use crate::note::ScalePreset;
use crate::piano::Piano;
use crate::pipeline::song::Song;
use crate::player::{Player, StopReason};
use crate::shared::{DisplayState, InputEvent, KeyId};

/// Owns all piano state and is the one entry point the host talks to:
/// input events in, frame ticks and timer firings in, display snapshots out.
pub struct Middle {
    piano: Piano,
    dispatcher: Dispatcher,
    player: Player,
    demo: Arc<Song>,
    visible_count: Debounced<i32>,
    scale: ScalePreset,
    load_requested: bool,
}

impl Middle {
    pub fn new(piano: Piano, config: &Config, demo: Song) -> Self {
        Self {
            piano,
            dispatcher: Dispatcher::new(),
            player: Player::new(&config.playback),
            demo: Arc::new(demo),
            visible_count: Debounced::new(config.input.debounce_ms),
            scale: ScalePreset::default(),
            load_requested: false,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<PianoEvent> {
        self.piano.subscribe()
    }

    // the host reports where it drew the keys after every frame
    pub fn set_keyboard_area(&mut self, area: KeyboardArea) {
        self.dispatcher.set_area(area);
    }

    pub fn handle_input(&mut self, event: InputEvent, now_ms: u64) {
        // samples load on the first gesture, not at startup
        if event.is_gesture() && !self.load_requested {
            self.load_requested = true;
            self.piano.load();
        }

        match event {
            InputEvent::ShiftWindow(delta) => {
                self.shift_window(delta);
            }
            InputEvent::ResizeWindow(delta) => {
                let base = self
                    .visible_count
                    .pending()
                    .copied()
                    .unwrap_or(self.piano.window().count() as i32);
                let count = self.piano.window().clamp_count(base + delta);
                self.request_visible_count(count, now_ms);
            }
            InputEvent::TogglePlay => {
                if self.player.is_playing() {
                    self.stop();
                } else {
                    self.play(self.demo.clone(), now_ms);
                }
            }
            InputEvent::NextScale => {
                self.scale = self.scale.next();
                self.set_suggested_keys(self.scale.keys());
            }
            InputEvent::Load => self.load(),
            InputEvent::Quit => {}
            other => self.dispatcher.handle(other, &mut self.piano),
        }
    }

    /// Per-frame work: finished loads, settled debounces, due song notes.
    pub fn tick(&mut self, now_ms: u64) {
        self.piano.poll();
        if let Some(count) = self.visible_count.take_due(now_ms) {
            self.piano.set_visible_count(count);
        }
        if self.player.tick(&mut self.piano, now_ms) == Some(StopReason::Completed) {
            self.dispatcher.reset();
        }
    }

    pub fn fire_timers(&mut self, now_ms: u64) {
        self.player.fire_timers(&mut self.piano, now_ms);
    }

    /// Earliest time something needs the loop awake (a note-off or a
    /// debounced resize).
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.player.next_timer_due(), self.visible_count.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn play(&mut self, song: Arc<Song>, now_ms: u64) -> bool {
        // player.play clears the piano, so the sources just forget their keys
        let started = self.player.play(song, &mut self.piano, now_ms);
        if started {
            self.dispatcher.reset();
            self.visible_count.cancel(); // the song picks its own view size
        }
        started
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.player.stop(&mut self.piano);
        if stopped {
            self.dispatcher.reset();
        }
        stopped
    }

    pub fn load(&mut self) {
        self.load_requested = true;
        self.piano.load();
    }

    pub fn shift_window(&mut self, delta: i32) -> bool {
        let start = self.piano.window().start().index() + delta;
        self.piano.set_start(start)
    }

    pub fn request_visible_count(&mut self, count: i32, now_ms: u64) {
        debug!(count, "Visible key count requested");
        self.visible_count.set(count, now_ms);
    }

    pub fn set_suggested_keys(&mut self, keys: Vec<KeyId>) {
        self.piano.set_suggested_keys(keys);
    }

    pub fn display_state(&self) -> DisplayState {
        let window = self.piano.window();
        DisplayState {
            start: window.start(),
            visible: window.count(),
            active: self.piano.active_keys().collect(),
            suggested: self.piano.suggested_keys().to_vec(),
            load_state: self.piano.load_state().clone(),
            playing: self.player.is_playing(),
            progress: self.player.progress(),
            song_name: self.player.song_name().map(str::to_string),
            scale_name: self.scale.name(),
        }
    }
}

impl Drop for Middle {
    fn drop(&mut self) {
        if self.player.is_playing() {
            info!("Stopping playback on shutdown");
            self.player.stop(&mut self.piano);
        }
    }
}
