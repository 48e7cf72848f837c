//! Note names, absolute pitch indices and frequencies.
//!
//! Pitch indices follow the usual equal-tempered numbering where octave 4
//! letter C is 60 and octave 4 letter A is the 440 Hz tuning reference (69):
//! `index = (octave + 1) * 12 + semitone`.

/// Tuning reference frequency in Hz.
pub const REFERENCE_FREQUENCY: f64 = 440.0;

/// Pitch index of the tuning reference (A4).
pub const REFERENCE_INDEX: i32 = 69;

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

fn letter_semitone(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse a root note like `C4`, `F#3`, `Bb-1` into a pitch index.
///
/// Input is trimmed and uppercased first, so `bb3` and `BB3` both read as
/// B-flat 3. Returns `None` for anything that isn't a letter A-G, an optional
/// single `#`/`b`, then a signed integer octave.
pub fn parse_root(text: &str) -> Option<i32> {
    let note = text.trim().to_uppercase();
    if note.chars().count() < 2 {
        return None;
    }
    let mut chars = note.chars();
    let semitone = letter_semitone(chars.next()?)?;
    let rest = chars.as_str();

    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('B') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let octave: i32 = octave_str.parse().ok()?;

    // octaves far enough out to overflow an index aren't notes
    octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(semitone + accidental)
}

/// Equal-tempered frequency of a pitch index.
pub fn pitch_to_frequency(pitch: i32) -> f64 {
    REFERENCE_FREQUENCY * 2.0_f64.powf((pitch - REFERENCE_INDEX) as f64 / 12.0)
}

/// Sharp-spelled name of a pitch index, e.g. 61 -> `C#4`.
pub fn pitch_name(pitch: i32) -> String {
    let octave = pitch.div_euclid(12) - 1;
    let name = SHARP_NAMES[pitch.rem_euclid(12) as usize];
    format!("{name}{octave}")
}
