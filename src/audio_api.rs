use crate::audio::SampleBuffer;
use crate::shared::KeyId;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't touch the disk from the audio thread, so anchors are
    // decoded by the loader first and handed over whole.
    RegisterAnchor { key: KeyId, buffer: SampleBuffer },

    // Played from the nearest registered anchor
    NoteOn { key: KeyId, velocity: f32 },
    NoteOff { key: KeyId },
    AllNotesOff,
}
