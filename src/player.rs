use std::sync::Arc;

use tracing::{debug, info};

use crate::config::PlaybackConfig;
use crate::events::PianoEvent;
use crate::piano::Piano;
use crate::pipeline::song::Song;
use crate::timers::ReleaseTimers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    Stopped,
}

struct Session {
    song: Arc<Song>,
    started_ms: u64,
    cursor: usize, // next untriggered note
    progress: f32,
}

/// Plays a song through the piano. Note-ons fire from `tick` (frame-driven);
/// note-offs are deferred timers fired from `fire_timers`, so how long a
/// note sounds doesn't depend on the frame rate.
pub struct Player {
    session: Option<Session>,
    timers: ReleaseTimers,
    min_visible: i32,
    max_visible: i32,
    scroll_margin: i32,
}

impl Player {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            session: None,
            timers: ReleaseTimers::default(),
            min_visible: config.min_visible.max(1),
            max_visible: config.max_visible.max(config.min_visible.max(1)),
            scroll_margin: config.scroll_margin.max(0),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.progress)
    }

    pub fn song_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.song.name())
    }

    pub fn next_timer_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// Start `song` from the beginning. Refused while the instrument isn't
    /// ready or another song is playing.
    pub fn play(&mut self, song: Arc<Song>, piano: &mut Piano, now_ms: u64) -> bool {
        if self.is_playing() || !piano.is_ready() {
            debug!(playing = self.is_playing(), "Play request ignored");
            return false;
        }
        piano.clear();

        let range = song.range();
        piano.set_visible_count(range.size().clamp(self.min_visible, self.max_visible));
        piano.center_on(range.center());

        info!(
            song = song.name(),
            notes = song.notes().len(),
            duration_ms = song.duration_ms(),
            "Playing song"
        );
        piano.publish(PianoEvent::PlaybackStarted {
            song: song.name().to_string(),
        });
        self.session = Some(Session {
            song,
            started_ms: now_ms,
            cursor: 0,
            progress: 0.0,
        });
        true
    }

    /// Advance to `now_ms`: trigger every note that has started, then keep the
    /// sounding notes in view. Returns the reason when the song just ended.
    pub fn tick(&mut self, piano: &mut Piano, now_ms: u64) -> Option<StopReason> {
        let session = self.session.as_mut()?;
        let elapsed = now_ms.saturating_sub(session.started_ms);
        let total = session.song.duration_ms();
        session.progress = if total == 0 {
            1.0
        } else {
            (elapsed as f32 / total as f32).min(1.0)
        };

        let notes = session.song.notes();
        let velocity = piano.default_velocity();
        while let Some(note) = notes.get(session.cursor) {
            if note.time_ms > elapsed {
                break;
            }
            piano.press_scripted(note.key, velocity);
            self.timers.schedule(now_ms + note.duration_ms, note.key);
            session.cursor += 1;
        }

        // only triggered notes can be sounding
        let sounding = notes[..session.cursor]
            .iter()
            .filter(|n| n.sounds_at(elapsed))
            .map(|n| n.key.index());
        let bounds = sounding.fold(None, |acc: Option<(i32, i32)>, k| match acc {
            None => Some((k, k)),
            Some((lo, hi)) => Some((lo.min(k), hi.max(k))),
        });
        if let Some((lo, hi)) = bounds {
            let center = (lo + hi) / 2;
            let window = piano.window();
            let start = window.start().index();
            let count = window.count() as i32;
            if center < start + self.scroll_margin || center > start + count - 1 - self.scroll_margin
            {
                piano.center_on(center);
            }
        }

        if elapsed >= total {
            self.finish(piano, StopReason::Completed);
            return Some(StopReason::Completed);
        }
        None
    }

    /// Release every note whose deferred note-off is due.
    pub fn fire_timers(&mut self, piano: &mut Piano, now_ms: u64) {
        for key in self.timers.drain_due(now_ms) {
            piano.release(key);
        }
    }

    pub fn stop(&mut self, piano: &mut Piano) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.finish(piano, StopReason::Stopped);
        true
    }

    fn finish(&mut self, piano: &mut Piano, reason: StopReason) {
        let cancelled = self.timers.cancel_all();
        let progress = self.progress();
        piano.clear();
        self.session = None;
        info!(?reason, cancelled_timers = cancelled, "Playback stopped");
        piano.publish(PianoEvent::PlaybackStopped {
            completed: reason == StopReason::Completed,
            progress,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::scores::fur_elise;
    use crate::shared::{KeyId, LoadState};
    use crate::testutil::{Call, RecordingInstrument, attacks, ready_piano, releases};

    fn player() -> Player {
        Player::new(&PlaybackConfig::default())
    }

    fn small_song() -> Arc<Song> {
        // two notes, 60 held across the second one
        Arc::new(Song::from_score("small", &[(60, 0, 300), (64, 100, 100)], 60, 64).unwrap())
    }

    #[test]
    fn test_play_requires_ready() {
        let (instrument, _) = RecordingInstrument::resolving_to(LoadState::Ready);
        let mut piano = Piano::new(Box::new(instrument), &Config::default());
        let mut player = player();
        assert!(!player.play(small_song(), &mut piano, 0));
        assert!(!player.is_playing());
    }

    #[test]
    fn test_play_sizes_and_centers_window() {
        let (mut piano, _) = ready_piano();
        let mut player = player();
        assert!(player.play(Arc::new(fur_elise().unwrap()), &mut piano, 0));
        // range 38..=79 is 42 keys, capped at 18 and centered on 58
        assert_eq!(18, piano.window().count());
        assert_eq!(KeyId(49), piano.window().start());
        assert!(!player.play(small_song(), &mut piano, 10));
    }

    #[test]
    fn test_notes_trigger_in_order_and_release_on_timers() {
        let (mut piano, calls) = ready_piano();
        let mut player = player();
        player.play(small_song(), &mut piano, 1000);

        assert_eq!(None, player.tick(&mut piano, 1000));
        assert!(piano.is_active(KeyId(60)));
        assert!(!piano.is_active(KeyId(64)));

        // a late frame still triggers everything that started
        assert_eq!(None, player.tick(&mut piano, 1150));
        assert!(piano.is_active(KeyId(64)));
        assert_eq!(2, attacks(&calls));

        // 60 is due at 1300, 64 at 1250
        player.fire_timers(&mut piano, 1260);
        assert!(!piano.is_active(KeyId(64)));
        assert!(piano.is_active(KeyId(60)));
        assert_eq!(Some(1300), player.next_timer_due());
        player.fire_timers(&mut piano, 1300);
        assert!(!piano.is_active(KeyId(60)));
        assert_eq!(2, releases(&calls));
    }

    #[test]
    fn test_no_note_triggers_twice() {
        let (mut piano, calls) = ready_piano();
        let mut player = player();
        player.play(small_song(), &mut piano, 0);
        for now in (0..300).step_by(16) {
            player.tick(&mut piano, now);
        }
        assert_eq!(2, attacks(&calls));
    }

    #[test]
    fn test_stop_cancels_timers() {
        let (mut piano, calls) = ready_piano();
        let mut player = player();
        player.play(small_song(), &mut piano, 0);
        player.tick(&mut piano, 150);
        assert!(player.stop(&mut piano));

        assert!(!player.is_playing());
        assert_eq!(0.0, player.progress());
        assert_eq!(0, piano.active_keys().count());
        assert_eq!(None, player.next_timer_due());

        // nothing fires later
        let before = calls.borrow().len();
        player.fire_timers(&mut piano, 10_000);
        assert_eq!(before, calls.borrow().len());
        assert_eq!(Some(&Call::ReleaseAll), calls.borrow().last());
        assert!(!player.stop(&mut piano));
    }

    #[test]
    fn test_fur_elise_runs_to_completion() {
        let (mut piano, calls) = ready_piano();
        let rx = piano.subscribe();
        let mut player = player();
        player.play(Arc::new(fur_elise().unwrap()), &mut piano, 0);

        let mut now = 0;
        while now < 38800 {
            player.fire_timers(&mut piano, now);
            assert_eq!(None, player.tick(&mut piano, now));
            now += 16;
        }
        assert!(player.progress() > 0.99);
        assert_eq!(132, attacks(&calls));

        player.fire_timers(&mut piano, 38800);
        assert_eq!(Some(StopReason::Completed), player.tick(&mut piano, 38800));
        assert!(!player.is_playing());
        assert_eq!(0.0, player.progress());
        assert_eq!(0, piano.active_keys().count());

        let stopped = rx
            .try_iter()
            .find(|e| matches!(e, PianoEvent::PlaybackStopped { .. }));
        assert_eq!(
            Some(PianoEvent::PlaybackStopped {
                completed: true,
                progress: 1.0
            }),
            stopped
        );
    }

    #[test]
    fn test_auto_scroll_follows_melody() {
        let (mut piano, _) = ready_piano();
        let mut player = player();
        let song = Song::from_score("leap", &[(40, 0, 100), (80, 200, 100)], 40, 80).unwrap();
        player.play(Arc::new(song), &mut piano, 0);

        player.tick(&mut piano, 0);
        assert!(piano.window().contains(KeyId(40)));
        player.tick(&mut piano, 250);
        assert!(piano.window().contains(KeyId(80)));
        assert_eq!(KeyId(70), piano.window().start()); // as far right as it goes
    }
}
