//! Chains a song's steps (sequence + transposition root) one after another.

use rand::Rng;

use super::data::{MusicData, Song, Step};
use super::pitch::parse_root;
use super::scale::Scale;
use super::scheduler::{Overrides, ToneSink, schedule_sequence};
use crate::error::MusicError;

// Overrides for one step: the step's own fields first, then the call's.
fn step_overrides(step: &Step, call: &Overrides) -> Overrides {
    Overrides {
        scale: step.scale.as_deref().map(Scale::from_name).or(call.scale),
        staccato: step.staccato,
        octave_split: step.octave_split,
        tempo: step.tempo.or(call.tempo),
        wave: call.wave,
    }
}

fn schedule_step<S: ToneSink, R: Rng>(
    data: &MusicData,
    step: &Step,
    start: f64,
    call: &Overrides,
    sink: &mut S,
    rng: &mut R,
) -> Result<f64, MusicError> {
    let (Some(name), Some(root_text)) = (step.sequence.as_deref(), step.root.as_deref()) else {
        return Err(MusicError::IncompleteStep(format!("{step:?}")));
    };
    let sequence = data.sequence(name)?;
    let root = parse_root(root_text).ok_or_else(|| MusicError::InvalidRoot(root_text.to_string()))?;
    Ok(schedule_sequence(data, sequence, root, start, &step_overrides(step, call), sink, rng))
}

/// Schedule every step of `song`, `song.loops()` times over, and return the
/// total duration. Steps that can't be played are skipped and take no time.
pub fn schedule_song<S: ToneSink, R: Rng>(
    data: &MusicData,
    song: &Song,
    start: f64,
    call: &Overrides,
    sink: &mut S,
    rng: &mut R,
) -> f64 {
    let mut t = start;
    for pass in 0..song.loops() {
        for (index, step) in song.steps().iter().enumerate() {
            match schedule_step(data, step, t, call, sink, rng) {
                Ok(duration) => t += duration,
                Err(e) => log::warn!(target: "seqtone::song", "pass {pass} step {index} skipped: {e}"),
            }
        }
    }
    t - start
}
