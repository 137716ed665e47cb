use std::path::Path;

use tracing::debug;

use crate::audio::SampleBuffer;
use crate::loader::error::LoadError;
use crate::note::note_to_key;
use crate::shared::KeyId;

// Pitches recorded in the sample set, roughly every minor third. Pitches in
// between are shifted from the nearest anchor by the engine.
pub const ANCHOR_PITCHES: [&str; 26] = [
    "A0", "C1", "D#1", "F#1", "A1", "C2", "D#2", "F#2", "A2", "C3", "D#3", "F#3", "A3", "C4",
    "D#4", "F#4", "A4", "C5", "D#5", "F#5", "A5", "C6", "D#6", "F#6", "A7", "C8",
];

/// One decoded anchor, ready to hand to the audio engine.
pub struct Anchor {
    pub key: KeyId,
    pub buffer: SampleBuffer,
}

// "D#1" -> "Ds1.wav"
pub fn anchor_file_name(pitch: &str) -> String {
    format!("{}.wav", pitch.replace('#', "s"))
}

/// Anchors that land on the keyboard, with their pitch names.
pub fn anchor_keys() -> Vec<(&'static str, KeyId)> {
    ANCHOR_PITCHES
        .iter()
        .filter_map(|pitch| note_to_key(pitch).map(|key| (*pitch, key)))
        .collect()
}

// Runs on the loader thread. The first missing or broken file fails the
// whole load.
pub fn load_anchors(dir: &Path, target_rate: u32) -> Result<Vec<Anchor>, LoadError> {
    anchor_keys()
        .into_iter()
        .map(|(pitch, key)| {
            let path = dir.join(anchor_file_name(pitch));
            let buffer = SampleBuffer::load_wav(&path, target_rate)?;
            debug!(pitch, key = key.0, frames = buffer.data.len(), "Loaded anchor");
            Ok(Anchor { key, buffer })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_test_wav;

    #[test]
    fn test_file_names() {
        assert_eq!("A0.wav", anchor_file_name("A0"));
        assert_eq!("Ds1.wav", anchor_file_name("D#1"));
        assert_eq!("Fs6.wav", anchor_file_name("F#6"));
    }

    #[test]
    fn test_off_keyboard_anchors_skipped() {
        let keys = anchor_keys();
        let names: Vec<&str> = keys.iter().map(|(p, _)| *p).collect();
        assert!(!names.contains(&"A7"));
        assert!(!names.contains(&"C8"));
        assert!(!names.contains(&"F#6"));
        assert_eq!(("A0", KeyId(21)), keys[0]);
        assert_eq!(("D#6", KeyId(87)), *keys.last().unwrap());
        assert_eq!(23, keys.len());
    }

    #[test]
    fn test_load_all_anchors() {
        let dir = tempfile::tempdir().unwrap();
        for (pitch, _) in anchor_keys() {
            write_test_wav(&dir.path().join(anchor_file_name(pitch)), 2, 32);
        }
        let anchors = load_anchors(dir.path(), 44100).unwrap();
        assert_eq!(23, anchors.len());
        assert_eq!(KeyId(60), anchors[13].key);
    }

    #[test]
    fn test_missing_anchor_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_test_wav(&dir.path().join("A0.wav"), 1, 32);
        assert!(matches!(
            load_anchors(dir.path(), 44100),
            Err(LoadError::Wav { .. })
        ));
    }
}
