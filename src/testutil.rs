// Shared fixtures for unit tests.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::config::Config;
use crate::instrument::Instrument;
use crate::piano::Piano;
use crate::shared::LoadState;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Load,
    Attack(String, f32),
    Release(String),
    ReleaseAll,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Instrument that records every call the piano makes. Like the real one it
/// ignores attacks and releases until it is ready.
pub struct RecordingInstrument {
    state: LoadState,
    on_poll: Option<LoadState>, // what a pending load resolves to
    calls: CallLog,
}

impl RecordingInstrument {
    pub fn ready() -> (Self, CallLog) {
        Self::with_state(LoadState::Ready, None)
    }

    /// Starts unloaded; a load resolves to `outcome` on the next poll.
    pub fn resolving_to(outcome: LoadState) -> (Self, CallLog) {
        Self::with_state(LoadState::NotLoaded, Some(outcome))
    }

    fn with_state(state: LoadState, on_poll: Option<LoadState>) -> (Self, CallLog) {
        let calls = CallLog::default();
        let instrument = Self {
            state,
            on_poll,
            calls: calls.clone(),
        };
        (instrument, calls)
    }
}

impl Instrument for RecordingInstrument {
    fn load(&mut self) {
        self.calls.borrow_mut().push(Call::Load);
        if matches!(self.state, LoadState::NotLoaded | LoadState::Failed(_)) {
            self.state = LoadState::Loading;
        }
    }

    fn poll(&mut self) -> Option<LoadState> {
        if self.state != LoadState::Loading {
            return None;
        }
        self.state = self.on_poll.clone()?;
        Some(self.state.clone())
    }

    fn state(&self) -> &LoadState {
        &self.state
    }

    fn attack(&mut self, pitch: &str, velocity: f32) {
        if self.state.is_ready() {
            self.calls
                .borrow_mut()
                .push(Call::Attack(pitch.to_string(), velocity));
        }
    }

    fn release(&mut self, pitch: &str) {
        if self.state.is_ready() {
            self.calls.borrow_mut().push(Call::Release(pitch.to_string()));
        }
    }

    fn release_all(&mut self) {
        if self.state.is_ready() {
            self.calls.borrow_mut().push(Call::ReleaseAll);
        }
    }
}

pub fn ready_piano() -> (Piano, CallLog) {
    let (instrument, calls) = RecordingInstrument::ready();
    (Piano::new(Box::new(instrument), &Config::default()), calls)
}

pub fn attacks(calls: &CallLog) -> usize {
    calls
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Attack(..)))
        .count()
}

pub fn releases(calls: &CallLog) -> usize {
    calls
        .borrow()
        .iter()
        .filter(|c| matches!(c, Call::Release(_)))
        .count()
}

/// Write a short 16-bit sine WAV at 44.1 kHz.
pub fn write_test_wav(path: &Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let s = ((i as f32 * 0.05).sin() * 16000.0) as i16;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}
