//! The music document: patterns, sequences and songs, as loaded from JSON.
//!
//! Loose or legacy encodings are normalized here, at the boundary, so the
//! scheduler only ever sees canonical values (e.g. the three spellings of
//! octave-split all end up as one `Option<OctaveSplit>`).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::note::NoteEntry;
use crate::error::MusicError;

pub const DEFAULT_TEMPO: f64 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OctaveSplit {
    Up,
    Down,
    Random,
}

impl OctaveSplit {
    /// Accepts `up|down|random` and the older `octave_split_*` spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "octave_split_up" => Some(OctaveSplit::Up),
            "down" | "octave_split_down" => Some(OctaveSplit::Down),
            "random" | "octave_split_random" => Some(OctaveSplit::Random),
            _ => None,
        }
    }
}

fn split_from_value(value: Option<&Value>) -> Option<OctaveSplit> {
    value.and_then(Value::as_str).and_then(OctaveSplit::parse)
}

// Shape as it sits in the JSON, before normalization.
#[derive(Deserialize)]
struct RawSequence {
    #[serde(default)]
    notes: Vec<NoteEntry>,
    pattern: Option<String>,
    tempo: Option<f64>,
    scale: Option<String>,
    wave: Option<String>,
    staccato: Option<bool>,
    octave_split: Option<Value>,
    #[serde(default)]
    octave_split_up: bool,
    #[serde(default)]
    octave_split_down: bool,
    #[serde(default)]
    octave_split_random: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawSequence")]
pub struct Sequence {
    pub notes: Vec<NoteEntry>,
    pub pattern: Option<String>,
    pub tempo: Option<f64>,
    pub scale: Option<String>,
    pub wave: Option<String>,
    pub staccato: Option<bool>,
    pub octave_split: Option<OctaveSplit>,
}

impl From<RawSequence> for Sequence {
    fn from(raw: RawSequence) -> Self {
        let octave_split = split_from_value(raw.octave_split.as_ref()).or(
            if raw.octave_split_up {
                Some(OctaveSplit::Up)
            } else if raw.octave_split_down {
                Some(OctaveSplit::Down)
            } else if raw.octave_split_random {
                Some(OctaveSplit::Random)
            } else {
                None
            },
        );
        Self {
            notes: raw.notes,
            pattern: raw.pattern,
            tempo: raw.tempo,
            scale: raw.scale,
            wave: raw.wave,
            staccato: raw.staccato,
            octave_split,
        }
    }
}

#[derive(Deserialize)]
struct RawStep {
    sequence: Option<String>,
    root: Option<String>,
    scale: Option<String>,
    staccato: Option<bool>,
    octave_split: Option<Value>,
    tempo: Option<f64>,
}

/// One entry of a song. `sequence`/`root` are optional at this level because a
/// step missing either is skipped at play time, not rejected at load time.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "RawStep")]
pub struct Step {
    pub sequence: Option<String>,
    pub root: Option<String>,
    pub scale: Option<String>,
    pub staccato: Option<bool>,
    pub octave_split: Option<OctaveSplit>,
    pub tempo: Option<f64>,
}

impl From<RawStep> for Step {
    fn from(raw: RawStep) -> Self {
        Self {
            sequence: raw.sequence.filter(|s| !s.is_empty()),
            root: raw.root.filter(|s| !s.is_empty()),
            scale: raw.scale.filter(|s| !s.is_empty()),
            staccato: raw.staccato,
            octave_split: split_from_value(raw.octave_split.as_ref()),
            tempo: raw.tempo,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Song {
    /// Plain list, played once. Never sfx-playable.
    Steps(Vec<Step>),
    Structured {
        repeat: Option<f64>,
        #[serde(default)]
        steps: Vec<Step>,
        #[serde(default)]
        sfx: bool,
    },
}

impl Song {
    pub fn steps(&self) -> &[Step] {
        match self {
            Song::Steps(steps) => steps,
            Song::Structured { steps, .. } => steps,
        }
    }

    /// Whole-song loop count: floored and clamped to at least 1.
    pub fn loops(&self) -> u32 {
        match self {
            Song::Steps(_) => 1,
            Song::Structured { repeat, .. } => match repeat {
                Some(n) if n.is_finite() && *n >= 1.0 => n.floor().min(u32::MAX as f64) as u32,
                _ => 1,
            },
        }
    }

    pub fn is_sfx(&self) -> bool {
        matches!(self, Song::Structured { sfx: true, .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MusicData {
    pub patterns: HashMap<String, Vec<NoteEntry>>,
    pub sequences: HashMap<String, Sequence>,
    pub songs: HashMap<String, Song>,
}

impl MusicData {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn read(path: &Path) -> Result<Self, MusicError> {
        let text = std::fs::read_to_string(path).map_err(|source| MusicError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| MusicError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`MusicData::read`] but a failure degrades to an empty document,
    /// so every later lookup just comes up missing.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::read(path) {
            Ok(data) => {
                log::info!(
                    target: "seqtone::data",
                    "loaded {} patterns, {} sequences, {} songs from {}",
                    data.patterns.len(),
                    data.sequences.len(),
                    data.songs.len(),
                    path.display()
                );
                data
            }
            Err(e) => {
                log::warn!(target: "seqtone::data", "{}; continuing with empty music data", error_chain(e));
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.sequences.is_empty() && self.songs.is_empty()
    }

    pub fn sequence(&self, name: &str) -> Result<&Sequence, MusicError> {
        self.sequences
            .get(name)
            .ok_or_else(|| MusicError::UnknownSequence(name.to_string()))
    }

    pub fn song(&self, name: &str) -> Result<&Song, MusicError> {
        self.songs
            .get(name)
            .ok_or_else(|| MusicError::UnknownSong(name.to_string()))
    }

    /// The note list a sequence plays: its own notes when non-empty, otherwise
    /// the referenced pattern, otherwise nothing.
    pub fn notes_for<'a>(&'a self, sequence: &'a Sequence) -> Result<&'a [NoteEntry], MusicError> {
        if !sequence.notes.is_empty() {
            return Ok(&sequence.notes);
        }
        match sequence.pattern.as_deref() {
            Some(name) if !name.is_empty() => self
                .patterns
                .get(name)
                .map(Vec::as_slice)
                .ok_or_else(|| MusicError::UnknownPattern(name.to_string())),
            _ => Ok(&[]),
        }
    }

    pub fn sorted_sequence_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sequences.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn sorted_song_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.songs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// "unable to parse ...: expected value at line 1 column 3"
fn error_chain(e: MusicError) -> String {
    format!("{:#}", anyhow::Error::from(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::music::parse_root;

    const DOC: &str = r#"{
        "patterns": { "arp": [[1], [3], [5], [0, 2]] },
        "sequences": {
            "inline": { "notes": [[1, 0.5], [2]], "tempo": 90, "scale": "minor", "staccato": true },
            "from_pattern": { "pattern": "arp", "wave": "sine" },
            "both": { "notes": [[7]], "pattern": "arp" },
            "legacy_split": { "notes": [[1]], "octave_split_down": true },
            "string_split": { "notes": [[1]], "octave_split": "octave_split_random", "octave_split_up": true },
            "bad_pattern": { "pattern": "nope" }
        },
        "songs": {
            "plain": [ { "sequence": "inline", "root": "C4" }, { "sequence": "from_pattern" } ],
            "looped": { "repeat": 2.7, "steps": [ { "sequence": "inline", "root": "A3", "octave_split": "up", "tempo": 60 } ] },
            "chime": { "sfx": true, "steps": [ { "sequence": "from_pattern", "root": "E5" } ] },
            "zero": { "repeat": 0, "steps": [] }
        }
    }"#;

    fn doc() -> MusicData {
        MusicData::from_json(DOC).unwrap()
    }

    #[test]
    fn sequences_keep_optional_fields() {
        let data = doc();
        let seq = data.sequence("inline").unwrap();
        assert_eq!(seq.tempo, Some(90.0));
        assert_eq!(seq.scale.as_deref(), Some("minor"));
        assert_eq!(seq.staccato, Some(true));
        assert_eq!(seq.octave_split, None);

        let seq = data.sequence("from_pattern").unwrap();
        assert_eq!(seq.tempo, None);
        assert_eq!(seq.wave.as_deref(), Some("sine"));
    }

    #[test]
    fn octave_split_spellings_normalize() {
        let data = doc();
        assert_eq!(data.sequence("legacy_split").unwrap().octave_split, Some(OctaveSplit::Down));
        // the string field wins over the boolean flags
        assert_eq!(data.sequence("string_split").unwrap().octave_split, Some(OctaveSplit::Random));
        assert_eq!(OctaveSplit::parse(" UP "), Some(OctaveSplit::Up));
        assert_eq!(OctaveSplit::parse("sideways"), None);
    }

    #[test]
    fn note_source_precedence() {
        let data = doc();
        assert_eq!(data.notes_for(data.sequence("inline").unwrap()).unwrap().len(), 2);
        assert_eq!(data.notes_for(data.sequence("from_pattern").unwrap()).unwrap().len(), 4);
        // embedded notes beat the pattern reference
        assert_eq!(data.notes_for(data.sequence("both").unwrap()).unwrap().len(), 1);
        assert!(matches!(
            data.notes_for(data.sequence("bad_pattern").unwrap()),
            Err(MusicError::UnknownPattern(name)) if name == "nope"
        ));
        assert!(data.notes_for(&Sequence::default()).unwrap().is_empty());
    }

    #[test]
    fn song_forms() {
        let data = doc();
        let plain = data.song("plain").unwrap();
        assert_eq!(plain.loops(), 1);
        assert_eq!(plain.steps().len(), 2);
        assert!(!plain.is_sfx());
        assert_eq!(plain.steps()[1].root, None);

        let looped = data.song("looped").unwrap();
        assert_eq!(looped.loops(), 2);
        let step = &looped.steps()[0];
        assert_eq!(step.octave_split, Some(OctaveSplit::Up));
        assert_eq!(step.tempo, Some(60.0));

        assert!(data.song("chime").unwrap().is_sfx());
        assert_eq!(data.song("zero").unwrap().loops(), 1);
        assert!(data.song("zero").unwrap().steps().is_empty());
    }

    #[test]
    fn unknown_names_are_errors() {
        let data = doc();
        assert!(matches!(data.sequence("nah"), Err(MusicError::UnknownSequence(_))));
        assert!(matches!(data.song("nah"), Err(MusicError::UnknownSong(_))));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let data = MusicData::from_json(r#"{ "sequences": {} }"#).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn load_failures_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(MusicData::load_or_empty(&missing).is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::File::create(&broken).unwrap().write_all(b"{ not json").unwrap();
        assert!(matches!(MusicData::read(&broken), Err(MusicError::Parse { .. })));
        assert!(MusicData::load_or_empty(&broken).is_empty());
        let logged = error_chain(MusicData::read(&broken).unwrap_err());
        assert!(logged.contains("broken.json"), "{logged}");
        assert!(logged.contains("line 1 column"), "{logged}");
        assert!(error_chain(MusicData::read(&missing).unwrap_err()).contains(": "));

        let good = dir.path().join("music.json");
        std::fs::write(&good, DOC).unwrap();
        assert_eq!(MusicData::load_or_empty(&good).sequences.len(), 6);
    }

    #[test]
    fn sorted_names() {
        let data = doc();
        assert_eq!(data.sorted_song_names(), vec!["chime", "looped", "plain", "zero"]);
        assert_eq!(data.sorted_sequence_names()[0], "bad_pattern");
    }

    #[test]
    fn bundled_data_is_consistent() {
        let data = MusicData::from_json(include_str!("../../data/music.json")).unwrap();
        for name in data.sorted_sequence_names() {
            let seq = data.sequence(name).unwrap();
            assert!(!data.notes_for(seq).unwrap().is_empty(), "{name} has no notes");
        }
        for name in data.sorted_song_names() {
            for step in data.song(name).unwrap().steps() {
                let seq = step.sequence.as_deref().unwrap();
                assert!(data.sequence(seq).is_ok(), "{name} names unknown sequence {seq}");
                assert!(step.root.as_deref().and_then(parse_root).is_some());
            }
        }
    }
}
