use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{error, info, trace, warn};

use crate::audio_api::AudioCommand;
use crate::loader::error::LoadError;
use crate::loader::sample_loader::{self, Anchor};
use crate::note::note_to_key;
use crate::shared::LoadState;

/// Sound source behind the piano. Pitches are addressed by name ("C#4").
pub trait Instrument {
    /// Start loading. A no-op while loading or ready; retries after a failure.
    fn load(&mut self);

    /// Finish a pending load, returning the new state when it changed.
    fn poll(&mut self) -> Option<LoadState>;

    fn state(&self) -> &LoadState;

    /// Start sounding `pitch`. Ignored unless ready.
    fn attack(&mut self, pitch: &str, velocity: f32);

    /// Let `pitch` decay through its release tail. Ignored unless ready.
    fn release(&mut self, pitch: &str);

    fn release_all(&mut self);
}

type LoadResult = Result<Vec<Anchor>, LoadError>;

// Sampled piano. Anchors are decoded on a loader thread and handed to the
// audio engine whole; every other pitch is shifted from the nearest anchor
// by the engine.
pub struct SampleInstrument {
    commands: Option<Sender<AudioCommand>>, // None when there is no output device
    samples_dir: PathBuf,
    sample_rate: u32,
    state: LoadState,
    loading: Option<Receiver<LoadResult>>,
}

impl SampleInstrument {
    pub fn new(
        commands: Option<Sender<AudioCommand>>,
        samples_dir: PathBuf,
        sample_rate: u32,
    ) -> Self {
        Self {
            commands,
            samples_dir,
            sample_rate,
            state: LoadState::NotLoaded,
            loading: None,
        }
    }

    fn send(&self, cmd: AudioCommand) {
        if let Some(tx) = &self.commands {
            if tx.try_send(cmd).is_err() {
                warn!("Audio command queue full, dropping command");
            }
        }
    }

    fn fail(&mut self, err: LoadError) {
        error!(err = %err, dir = ?self.samples_dir, "Failed to load piano samples");
        self.state = LoadState::Failed(err.to_string());
    }

    fn spawn_loader(&mut self) -> Result<(), LoadError> {
        if self.commands.is_none() {
            return Err(LoadError::NoOutput);
        }
        let (tx, rx) = crossbeam_channel::bounded::<LoadResult>(1);
        let dir = self.samples_dir.clone();
        let sample_rate = self.sample_rate;
        std::thread::Builder::new()
            .name("sample-loader".into())
            .spawn(move || {
                let _ = tx.send(sample_loader::load_anchors(&dir, sample_rate));
            })?;
        self.loading = Some(rx);
        Ok(())
    }
}

impl Instrument for SampleInstrument {
    fn load(&mut self) {
        if matches!(self.state, LoadState::Loading | LoadState::Ready) {
            return;
        }
        info!(dir = ?self.samples_dir, "Loading piano samples");
        match self.spawn_loader() {
            Ok(()) => self.state = LoadState::Loading,
            Err(err) => self.fail(err),
        }
    }

    fn poll(&mut self) -> Option<LoadState> {
        let rx = self.loading.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::LoaderGone),
        };
        self.loading = None;

        match result {
            Ok(anchors) => {
                info!(anchors = anchors.len(), "Piano samples loaded");
                for anchor in anchors {
                    self.send(AudioCommand::RegisterAnchor {
                        key: anchor.key,
                        buffer: anchor.buffer,
                    });
                }
                self.state = LoadState::Ready;
            }
            Err(err) => self.fail(err),
        }
        Some(self.state.clone())
    }

    fn state(&self) -> &LoadState {
        &self.state
    }

    fn attack(&mut self, pitch: &str, velocity: f32) {
        if !self.state.is_ready() {
            return;
        }
        match note_to_key(pitch) {
            Some(key) => self.send(AudioCommand::NoteOn { key, velocity }),
            None => trace!(pitch, "Ignoring attack for unknown pitch"),
        }
    }

    fn release(&mut self, pitch: &str) {
        if !self.state.is_ready() {
            return;
        }
        if let Some(key) = note_to_key(pitch) {
            self.send(AudioCommand::NoteOff { key });
        }
    }

    fn release_all(&mut self) {
        if self.state.is_ready() {
            self.send(AudioCommand::AllNotesOff);
        }
    }
}
