//! Walks a sequence's notes and turns them into timed tones.

use rand::Rng;

use super::data::{DEFAULT_TEMPO, MusicData, OctaveSplit, Sequence};
use super::pitch::pitch_to_frequency;
use super::scale::Scale;
use crate::audio::Waveform;

/// A tone the scheduler wants sounded. Times are seconds on the device clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneRequest {
    pub frequency: f64,
    pub wave: Waveform,
    pub start: f64,
    pub duration: f64,
}

/// Where scheduled tones go. The player's emitter registers them with a
/// channel and hands them to the output device; tests just collect them.
pub trait ToneSink {
    fn emit(&mut self, tone: ToneRequest);
}

impl ToneSink for Vec<ToneRequest> {
    fn emit(&mut self, tone: ToneRequest) {
        self.push(tone);
    }
}

/// Per-invocation overrides. Anything left `None` falls through to the
/// sequence's own value and then to the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overrides {
    pub scale: Option<Scale>,
    pub staccato: Option<bool>,
    pub octave_split: Option<OctaveSplit>,
    pub tempo: Option<f64>,
    pub wave: Option<Waveform>,
}

/// Settings resolved once per sequence invocation and held for the whole walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    pub tempo: f64,
    pub scale: Scale,
    pub wave: Waveform,
    pub staccato: bool,
    pub octave_split: Option<OctaveSplit>,
}

impl Resolved {
    pub fn new(sequence: &Sequence, overrides: &Overrides) -> Self {
        let tempo = match overrides.tempo.or(sequence.tempo) {
            Some(t) if t.is_finite() && t > 0.0 => t,
            Some(t) => {
                log::warn!(target: "seqtone::scheduler", "tempo {t} is unusable, using {DEFAULT_TEMPO}");
                DEFAULT_TEMPO
            }
            None => DEFAULT_TEMPO,
        };
        let scale = overrides
            .scale
            .or_else(|| sequence.scale.as_deref().map(Scale::from_name))
            .unwrap_or_default();
        let wave = overrides
            .wave
            .or_else(|| sequence.wave.as_deref().map(Waveform::from_name))
            .unwrap_or_default();
        let octave_split = overrides.octave_split.or(sequence.octave_split);
        // octave-split and staccato don't mix; the split wins
        let staccato = overrides.staccato.or(sequence.staccato).unwrap_or(false) && octave_split.is_none();
        Self { tempo, scale, wave, staccato, octave_split }
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo
    }
}

/// Schedule every note of `sequence` starting at `start`, returning how long
/// the notes take so the caller can chain whatever comes next.
pub fn schedule_sequence<S, R>(
    data: &MusicData,
    sequence: &Sequence,
    root: i32,
    start: f64,
    overrides: &Overrides,
    sink: &mut S,
    rng: &mut R,
) -> f64
where
    S: ToneSink,
    R: Rng,
{
    let notes = match data.notes_for(sequence) {
        Ok(notes) => notes,
        Err(e) => {
            log::warn!(target: "seqtone::scheduler", "{e}; sequence plays nothing");
            return 0.0;
        }
    };
    let settings = Resolved::new(sequence, overrides);
    let seconds_per_beat = settings.seconds_per_beat();
    let mut t = start;

    for entry in notes {
        let note = match entry.normalize() {
            Ok(note) => note,
            Err(e) => {
                log::warn!(target: "seqtone::scheduler", "skipping note: {e}");
                continue;
            }
        };
        let duration = (note.beats * seconds_per_beat).max(0.0);
        if note.is_rest() {
            t += duration;
            continue;
        }

        let voice = |octave_shift: i32| {
            settings
                .scale
                .degree_to_pitch(root, note.degree, octave_shift, note.accidental)
                .map(pitch_to_frequency)
                // the device works in f32; pitches past that range can't sound
                .filter(|f| (*f as f32).is_finite())
        };

        if let Some(split) = settings.octave_split {
            let half = duration * 0.5;
            let shift = match split {
                OctaveSplit::Up => 1,
                OctaveSplit::Down => -1,
                OctaveSplit::Random => {
                    if rng.random_bool(0.5) { 1 } else { -1 }
                }
            };
            if let Some(frequency) = voice(note.octave_shift) {
                sink.emit(ToneRequest { frequency, wave: settings.wave, start: t, duration: half });
            }
            if let Some(frequency) = note.octave_shift.checked_add(shift).and_then(voice) {
                sink.emit(ToneRequest { frequency, wave: settings.wave, start: t + half, duration: half });
            }
        } else {
            let tone_duration = if settings.staccato { duration * 0.5 } else { duration };
            if let Some(frequency) = voice(note.octave_shift) {
                sink.emit(ToneRequest { frequency, wave: settings.wave, start: t, duration: tone_duration });
            }
        }
        t += duration;
    }

    t - start
}
