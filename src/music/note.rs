use serde::{Deserialize, Serialize};

use crate::error::MusicError;

/// One note as it appears in data: `[degree, beats?, octave_shift?, accidental?]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteEntry(pub Vec<f64>);

impl NoteEntry {
    pub fn normalize(&self) -> Result<Note, MusicError> {
        let slots = &self.0;
        let degree = *slots.first().ok_or(MusicError::EmptyNote)?;
        Ok(Note {
            degree: degree as i32,
            beats: slots.get(1).copied().unwrap_or(1.0),
            octave_shift: slots.get(2).map_or(0, |&v| v as i32),
            accidental: slots.get(3).map_or(0, |&v| v as i32),
        })
    }
}

impl<const N: usize> From<[f64; N]> for NoteEntry {
    fn from(slots: [f64; N]) -> Self {
        NoteEntry(slots.to_vec())
    }
}

/// A decoded note. Degree 0 is a rest lasting `beats`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub degree: i32,
    pub beats: f64,
    pub octave_shift: i32,
    pub accidental: i32,
}

impl Note {
    pub fn is_rest(&self) -> bool {
        self.degree == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slots_get_defaults() {
        let note = NoteEntry::from([3.0]).normalize().unwrap();
        assert_eq!(note, Note { degree: 3, beats: 1.0, octave_shift: 0, accidental: 0 });

        let note = NoteEntry::from([5.0, 0.5]).normalize().unwrap();
        assert_eq!(note.beats, 0.5);
        assert_eq!(note.octave_shift, 0);
    }

    #[test]
    fn all_slots_present() {
        let note = NoteEntry::from([2.0, 2.0, -1.0, 1.0]).normalize().unwrap();
        assert_eq!(note, Note { degree: 2, beats: 2.0, octave_shift: -1, accidental: 1 });
    }

    #[test]
    fn empty_entry_is_an_error() {
        assert!(matches!(NoteEntry(vec![]).normalize(), Err(MusicError::EmptyNote)));
    }

    #[test]
    fn deserializes_from_json_tuple() {
        let entry: NoteEntry = serde_json::from_str("[1, 0.25, 1]").unwrap();
        let note = entry.normalize().unwrap();
        assert_eq!(note.degree, 1);
        assert_eq!(note.beats, 0.25);
        assert_eq!(note.octave_shift, 1);
        assert!(!note.is_rest());
        assert!(NoteEntry::from([0.0, 2.0]).normalize().unwrap().is_rest());
    }
}
