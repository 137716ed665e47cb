use thiserror::Error;

use crate::shared::KeyId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SongError {
    #[error("song has no notes")]
    Empty,

    #[error("key range {min}..{max} is inverted")]
    InvertedRange { min: u8, max: u8 },

    #[error("key {0} is off the keyboard")]
    KeyOutOfRange(i32),
}

/// One note of a score, in milliseconds from the song start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SongNote {
    pub key: KeyId,
    pub time_ms: u64,
    pub duration_ms: u64,
}

impl SongNote {
    pub fn end_ms(&self) -> u64 {
        self.time_ms + self.duration_ms
    }

    /// Sounding at `elapsed_ms`, both ends inclusive.
    pub fn sounds_at(&self, elapsed_ms: u64) -> bool {
        self.time_ms <= elapsed_ms && elapsed_ms <= self.end_ms()
    }
}

/// Declared lowest and highest key of a song, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRange {
    pub min: KeyId,
    pub max: KeyId,
}

impl KeyRange {
    pub fn size(&self) -> i32 {
        self.max.index() - self.min.index() + 1
    }

    pub fn center(&self) -> i32 {
        (self.min.index() + self.max.index()) / 2
    }
}

/// An immutable score: notes sorted by start time plus the key range the
/// player sizes its view to.
#[derive(Clone, Debug)]
pub struct Song {
    name: String,
    notes: Vec<SongNote>,
    range: KeyRange,
    duration_ms: u64,
}

impl Song {
    pub fn new(
        name: impl Into<String>,
        mut notes: Vec<SongNote>,
        range: KeyRange,
    ) -> Result<Self, SongError> {
        if notes.is_empty() {
            return Err(SongError::Empty);
        }
        if range.min > range.max {
            return Err(SongError::InvertedRange {
                min: range.min.0,
                max: range.max.0,
            });
        }
        // stable, so chord notes keep their written order
        notes.sort_by_key(|n| n.time_ms);
        let duration_ms = notes.iter().map(SongNote::end_ms).max().unwrap_or(0);
        Ok(Self {
            name: name.into(),
            notes,
            range,
            duration_ms,
        })
    }

    /// Build from `(key, time_ms, duration_ms)` triples.
    pub fn from_score(
        name: &str,
        score: &[(i32, u64, u64)],
        min: i32,
        max: i32,
    ) -> Result<Self, SongError> {
        let key = |index: i32| KeyId::new(index).ok_or(SongError::KeyOutOfRange(index));
        let notes = score
            .iter()
            .map(|&(index, time_ms, duration_ms)| {
                Ok(SongNote {
                    key: key(index)?,
                    time_ms,
                    duration_ms,
                })
            })
            .collect::<Result<Vec<_>, SongError>>()?;
        let range = KeyRange {
            min: key(min)?,
            max: key(max)?,
        };
        Self::new(name, notes, range)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notes(&self) -> &[SongNote] {
        &self.notes
    }

    pub fn range(&self) -> KeyRange {
        self.range
    }

    /// Latest note end.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_timed() {
        let song = Song::from_score("t", &[(64, 500, 100), (60, 0, 1000), (62, 0, 200)], 60, 64)
            .unwrap();
        let keys: Vec<u8> = song.notes().iter().map(|n| n.key.0).collect();
        assert_eq!(vec![60, 62, 64], keys);
        assert_eq!(1000, song.duration_ms());
        assert_eq!(5, song.range().size());
        assert_eq!(62, song.range().center());
    }

    #[test]
    fn test_rejects_bad_scores() {
        assert_eq!(Some(SongError::Empty), Song::from_score("t", &[], 0, 1).err());
        assert_eq!(
            Some(SongError::KeyOutOfRange(88)),
            Song::from_score("t", &[(88, 0, 10)], 0, 87).err()
        );
        assert_eq!(
            Some(SongError::InvertedRange { min: 70, max: 60 }),
            Song::from_score("t", &[(60, 0, 10)], 70, 60).err()
        );
    }

    #[test]
    fn test_sounds_at_is_inclusive() {
        let note = SongNote {
            key: KeyId(60),
            time_ms: 100,
            duration_ms: 50,
        };
        assert!(!note.sounds_at(99));
        assert!(note.sounds_at(100));
        assert!(note.sounds_at(150));
        assert!(!note.sounds_at(151));
    }
}
