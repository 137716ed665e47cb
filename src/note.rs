// Key index <-> pitch name conversion.
//
// Octave numbering follows MIDI: key 60 is C4, key 0 is C-1. The demo score,
// the default window and the scale presets are all written in that numbering.

use crate::shared::KeyId;

pub const OCTAVE_OFFSET: i32 = -1;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn key_to_note(key: KeyId) -> String {
    let index = key.index();
    let octave = index / 12 + OCTAVE_OFFSET;
    format!("{}{}", PITCH_CLASSES[(index % 12) as usize], octave)
}

/// Parse a pitch name like "C#4" or "C-1". Unknown pitch classes, missing
/// octaves and pitches off the keyboard all give `None`.
pub fn note_to_key(name: &str) -> Option<KeyId> {
    let digits_at = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    // a minus sign directly before the digits belongs to the octave
    let octave_at = match name[..digits_at].strip_suffix('-') {
        Some(rest) => rest.len(),
        None => digits_at,
    };
    let (class, octave) = name.split_at(octave_at);
    let octave: i32 = octave.parse().ok()?;
    let pitch_class = PITCH_CLASSES.iter().position(|p| *p == class)? as i32;
    let index = octave
        .checked_sub(OCTAVE_OFFSET)?
        .checked_mul(12)?
        .checked_add(pitch_class)?;
    KeyId::new(index)
}

pub fn is_black_key(key: KeyId) -> bool {
    matches!(key.0 % 12, 1 | 3 | 6 | 8 | 10)
}

// Suggested-key presets. Each is one octave from the root in octave 4 plus
// the upper tonic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalePreset {
    #[default]
    CMajor,
    GMajor,
    FMajor,
    AMinor,
}

const MAJOR_STEPS: [u8; 8] = [0, 2, 4, 5, 7, 9, 11, 12];
const MINOR_STEPS: [u8; 8] = [0, 2, 3, 5, 7, 8, 10, 12];

impl ScalePreset {
    pub fn next(self) -> Self {
        match self {
            ScalePreset::CMajor => ScalePreset::GMajor,
            ScalePreset::GMajor => ScalePreset::FMajor,
            ScalePreset::FMajor => ScalePreset::AMinor,
            ScalePreset::AMinor => ScalePreset::CMajor,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalePreset::CMajor => "C Major",
            ScalePreset::GMajor => "G Major",
            ScalePreset::FMajor => "F Major",
            ScalePreset::AMinor => "A Minor",
        }
    }

    pub fn keys(self) -> Vec<KeyId> {
        let (root, steps) = match self {
            ScalePreset::CMajor => (60, MAJOR_STEPS),
            ScalePreset::GMajor => (67, MAJOR_STEPS),
            ScalePreset::FMajor => (65, MAJOR_STEPS),
            ScalePreset::AMinor => (69, MINOR_STEPS),
        };
        steps
            .iter()
            .filter_map(|step| KeyId::new(root + *step as i32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_keys() {
        for index in 0..88 {
            let key = KeyId(index);
            assert_eq!(Some(key), note_to_key(&key_to_note(key)), "{}", key_to_note(key));
        }
    }

    #[test]
    fn test_known_names() {
        assert_eq!("C4", key_to_note(KeyId(60)));
        assert_eq!("A4", key_to_note(KeyId(69)));
        assert_eq!("C-1", key_to_note(KeyId(0)));
        assert_eq!("D#6", key_to_note(KeyId(87)));
        assert_eq!(Some(KeyId(61)), note_to_key("C#4"));
        assert_eq!(Some(KeyId(21)), note_to_key("A0"));
    }

    #[test]
    fn test_bad_names() {
        assert_eq!(None, note_to_key("H4"));
        assert_eq!(None, note_to_key("C"));
        assert_eq!(None, note_to_key(""));
        assert_eq!(None, note_to_key("4"));
        assert_eq!(None, note_to_key("Db4")); // flats aren't in the table
        assert_eq!(None, note_to_key("C8")); // key 108, off the keyboard
        assert_eq!(None, note_to_key("C-2"));
        // octaves too large for the arithmetic
        assert_eq!(None, note_to_key("C999999999"));
        assert_eq!(None, note_to_key("C2147483647"));
        assert_eq!(None, note_to_key("C-2147483648"));
        assert_eq!(None, note_to_key("C99999999999"));
    }

    #[test]
    fn test_black_keys() {
        assert!(!is_black_key(KeyId(60)));
        assert!(is_black_key(KeyId(61)));
        assert!(is_black_key(KeyId(70)));
        assert!(!is_black_key(KeyId(71)));
    }

    #[test]
    fn test_scale_presets() {
        let c_major: Vec<u8> = ScalePreset::CMajor.keys().iter().map(|k| k.0).collect();
        assert_eq!(vec![60, 62, 64, 65, 67, 69, 71, 72], c_major);
        let a_minor: Vec<u8> = ScalePreset::AMinor.keys().iter().map(|k| k.0).collect();
        assert_eq!(vec![69, 71, 72, 74, 76, 77, 79, 81], a_minor);

        let mut preset = ScalePreset::default();
        for _ in 0..4 {
            preset = preset.next();
        }
        assert_eq!(ScalePreset::CMajor, preset);
    }
}
