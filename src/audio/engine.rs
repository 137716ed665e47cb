use crate::audio_api::AudioCommand;
use crate::config::AudioConfig;
use crate::shared::KeyId;

use super::effect::{Effect, EffectSpec};
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

const MAX_ANCHORS: usize = 32; // reserved up front so registering never reallocates

// Runs inside the audio callback: nothing here may block, and allocation is
// limited to moving in buffers the loader already decoded.
pub struct Engine {
    anchors: Vec<(KeyId, SampleBuffer)>, // sorted by key
    voices: Vec<Voice>,                  // fixed pool, sized once
    effects: Vec<Box<dyn Effect>>,
    release_coef: f32,
    note_counter: u64,
}

impl Engine {
    pub fn new(sample_rate: u32, config: &AudioConfig) -> Self {
        let sample_rate = sample_rate as f32;
        let release_frames = (config.release_secs.max(0.001) * sample_rate).max(1.0);
        let specs = [
            EffectSpec::Reverb {
                decay_secs: config.reverb_decay_secs,
                wet: config.reverb_wet,
            },
            EffectSpec::Gain {
                db: config.volume_db,
            },
        ];
        Self {
            anchors: Vec::with_capacity(MAX_ANCHORS),
            voices: vec![Voice::idle(); config.max_voices.max(1)],
            effects: specs.iter().map(|s| s.to_effect(sample_rate)).collect(),
            // voices drop below -66 dB and free up within release_secs
            release_coef: 10f32.powf(-3.4 / release_frames),
            note_counter: 0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterAnchor { key, buffer } => self.register_anchor(key, buffer),
            AudioCommand::NoteOn { key, velocity } => self.note_on(key, velocity),
            AudioCommand::NoteOff { key } => self.note_off(key),
            AudioCommand::AllNotesOff => self.all_notes_off(),
        }
    }

    fn register_anchor(&mut self, key: KeyId, buffer: SampleBuffer) {
        match self.anchors.binary_search_by_key(&key, |(k, _)| *k) {
            Ok(i) => self.anchors[i].1 = buffer,
            Err(i) => self.anchors.insert(i, (key, buffer)),
        }
    }

    // nearest anchor by semitone distance, the lower one on ties
    fn nearest_anchor(&self, key: KeyId) -> Option<usize> {
        self.anchors
            .iter()
            .enumerate()
            .min_by_key(|(_, (k, _))| (k.index() - key.index()).abs())
            .map(|(i, _)| i)
    }

    fn note_on(&mut self, key: KeyId, velocity: f32) {
        let Some(anchor) = self.nearest_anchor(key) else {
            return;
        };
        let semitones = (key.index() - self.anchors[anchor].0.index()) as f32;
        let rate = 2f32.powf(semitones / 12.0);

        // free slot, or steal the oldest voice
        let slot = self
            .voices
            .iter()
            .position(|v| !v.active)
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.started)
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);

        self.note_counter += 1;
        self.voices[slot] = Voice::start(key, anchor, rate, velocity, self.note_counter);
    }

    fn note_off(&mut self, key: KeyId) {
        for v in self.voices.iter_mut() {
            if v.active && v.key == key && !v.is_releasing() {
                v.release();
            }
        }
    }

    fn all_notes_off(&mut self) {
        for v in self.voices.iter_mut().filter(|v| v.active) {
            v.release();
        }
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for voice in self.voices.iter_mut() {
            if let Some((_, buffer)) = self.anchors.get(voice.anchor) {
                voice.render_into(buffer, out, self.release_coef);
            }
        }
        for effect in self.effects.iter_mut() {
            effect.process(out);
        }
    }
}
