use std::f32::consts::TAU;

use super::tone_id::ToneId;
use super::wave::Waveform;
use crate::audio_api::{CancelToken, ToneParams};

pub const ATTACK_SECS: f64 = 0.01;
pub const RELEASE_SECS: f64 = 0.03;
// gap left at the end of every tone so back-to-back tones don't click
pub const TAIL_SECS: f64 = 0.005;
// how fast a cancelled voice fades to nothing
pub const STOP_FADE_SECS: f64 = 0.005;

/// Linear attack / sustain / release shape for one tone, in seconds from the
/// tone's start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub release_start: f64,
    pub end: f64,
}

impl Envelope {
    pub fn for_duration(duration: f64) -> Self {
        let duration = duration.max(0.0);
        let tail = TAIL_SECS.min(duration * 0.1);
        let end = duration - tail;
        let attack = ATTACK_SECS.min(end * 0.25);
        let release = RELEASE_SECS.min(end * 0.5);
        Self {
            attack,
            release_start: end - release,
            end,
        }
    }

    /// Gain in 0..=1 at `t` seconds into the tone.
    pub fn gain_at(&self, t: f64) -> f32 {
        if t < 0.0 || t >= self.end {
            return 0.0;
        }
        let g = if t < self.attack {
            t / self.attack
        } else if t >= self.release_start {
            (self.end - t) / (self.end - self.release_start)
        } else {
            1.0
        };
        g.clamp(0.0, 1.0) as f32
    }
}

#[derive(Clone, Debug)]
pub struct ToneVoice {
    pub id: ToneId,
    wave: Waveform,
    phase: f32,
    phase_inc: f32, // radians per frame
    level: f32,
    envelope: Envelope,
    sample_rate: f64,
    pos: u64, // frames since the tone's start
    len: u64,
    cancel: CancelToken,
    fade: Option<(u32, u32)>, // (frames left, fade length) once cancelled
}

impl ToneVoice {
    // `offset` is how many frames late the voice is starting; a late voice
    // skips ahead so it still ends on time.
    pub fn new(tone: ToneParams, sample_rate: u32, offset: u64) -> Self {
        let sr = sample_rate as f64;
        let len = (tone.duration.max(0.0) * sr).round() as u64;
        let phase_inc = TAU * tone.frequency / sample_rate as f32;
        let phase = (phase_inc as f64 * offset as f64).rem_euclid(TAU as f64) as f32;
        Self {
            id: tone.id,
            wave: tone.wave,
            phase,
            phase_inc,
            level: tone.level,
            envelope: Envelope::for_duration(tone.duration),
            sample_rate: sr,
            pos: offset,
            len,
            cancel: tone.cancel,
            fade: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.len || matches!(self.fade, Some((0, _)))
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    // called once per block; starts the fade the first time the token is seen
    pub fn poll_cancel(&mut self) {
        if self.fade.is_none() && self.cancel.is_cancelled() {
            let frames = ((STOP_FADE_SECS * self.sample_rate).round() as u32).max(1);
            self.fade = Some((frames, frames));
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_done() {
            return 0.0;
        }
        let t = self.pos as f64 / self.sample_rate;
        let mut gain = self.envelope.gain_at(t) * self.level;
        if let Some((left, total)) = self.fade.as_mut() {
            gain *= *left as f32 / *total as f32;
            *left -= 1;
        }
        let out = self.wave.sample(self.phase) * gain;

        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.pos += 1;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tone(duration: f64) -> ToneParams {
        ToneParams {
            id: ToneId::next(),
            frequency: 440.0,
            wave: Waveform::Square,
            start: 0.0,
            duration,
            level: 0.5,
            cancel: CancelToken::new(),
        }
    }

    #[test]
    fn envelope_shape_for_normal_tone() {
        let env = Envelope::for_duration(0.5);
        assert_abs_diff_eq!(env.attack, ATTACK_SECS);
        assert_abs_diff_eq!(env.end, 0.5 - TAIL_SECS);
        assert_abs_diff_eq!(env.release_start, env.end - RELEASE_SECS);

        assert_eq!(env.gain_at(0.0), 0.0);
        assert_abs_diff_eq!(env.gain_at(ATTACK_SECS / 2.0), 0.5, epsilon = 1e-6);
        assert_eq!(env.gain_at(0.2), 1.0);
        assert!(env.gain_at(env.end - 0.001) < 0.1);
        assert_eq!(env.gain_at(env.end), 0.0);
        assert_eq!(env.gain_at(0.5), 0.0);
        assert_eq!(env.gain_at(-0.1), 0.0);
    }

    #[test]
    fn envelope_ends_before_the_tone_does() {
        for d in [0.001, 0.02, 0.1, 1.0, 4.0] {
            let env = Envelope::for_duration(d);
            assert!(env.end < d);
            assert!(env.attack <= env.release_start);
            assert!(env.release_start <= env.end);
        }
    }

    #[test]
    fn zero_length_tone_is_silent() {
        let env = Envelope::for_duration(0.0);
        assert_eq!(env.gain_at(0.0), 0.0);
        let mut voice = ToneVoice::new(tone(0.0), 48_000, 0);
        assert!(voice.is_done());
        assert_eq!(voice.next_sample(), 0.0);
    }

    #[test]
    fn voice_runs_for_its_duration() {
        let mut voice = ToneVoice::new(tone(0.01), 1000, 0);
        let samples: Vec<f32> = (0..10).map(|_| voice.next_sample()).collect();
        assert!(voice.is_done());
        assert!(samples.iter().all(|s| s.abs() <= 0.5));
        assert!(samples.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn late_start_skips_ahead() {
        let voice = ToneVoice::new(tone(0.1), 1000, 40);
        assert_eq!(voice.remaining(), 60);
    }

    #[test]
    fn cancel_fades_then_finishes() {
        let params = tone(1.0);
        let token = params.cancel.clone();
        let mut voice = ToneVoice::new(params, 1000, 0);
        for _ in 0..100 {
            voice.next_sample();
        }
        token.cancel();
        voice.poll_cancel();
        let fade = (STOP_FADE_SECS * 1000.0).round() as usize;
        for _ in 0..fade {
            assert!(!voice.is_done());
            voice.next_sample();
        }
        assert!(voice.is_done());
    }
}
