//! A device with no hardware behind it: a hand-advanced clock plus a log of
//! every tone scheduled on it, renderable to a WAV file through the same
//! engine the live device uses.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use anyhow::Context;

use super::device::OutputDevice;
use super::engine::Engine;
use crate::audio_api::{AudioCommand, ToneParams};

const RENDER_BLOCK: usize = 512;

#[derive(Debug, Default)]
pub struct OfflineDevice {
    now: f64,
    ready: bool,
    unavailable: bool,
    resumes: usize,
    tones: Vec<ToneParams>,
}

impl OfflineDevice {
    pub fn new() -> Self {
        Self::default()
    }

    // a device whose resume always fails, like a host with no output
    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Self::default() }
    }

    pub fn advance(&mut self, secs: f64) {
        self.now += secs.max(0.0);
    }

    /// How many times `resume` has been called, successful or not.
    pub fn resume_count(&self) -> usize {
        self.resumes
    }

    pub fn tones(&self) -> &[ToneParams] {
        &self.tones
    }

    /// Tones that have not been cancelled.
    pub fn live_tones(&self) -> impl Iterator<Item = &ToneParams> {
        self.tones.iter().filter(|t| !t.cancel.is_cancelled())
    }

    /// Where the last live tone ends, in device seconds.
    pub fn end_time(&self) -> f64 {
        self.live_tones().map(ToneParams::end).fold(0.0, f64::max)
    }

    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let mut engine = Engine::new(sample_rate, Arc::new(AtomicU64::new(0)));
        for tone in self.live_tones() {
            engine.handle_cmd(AudioCommand::Schedule(tone.clone()));
        }
        let total = (self.end_time() * sample_rate as f64).ceil() as usize;
        let mut out = vec![0.0f32; total];
        for block in out.chunks_mut(RENDER_BLOCK) {
            engine.render_block(block);
        }
        out
    }

    pub fn write_wav(&self, path: &Path, sample_rate: u32) -> anyhow::Result<usize> {
        let samples = self.render(sample_rate);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("could not create {}", path.display()))?;
        for s in &samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        Ok(samples.len())
    }
}

impl OutputDevice for OfflineDevice {
    fn now(&self) -> f64 {
        self.now
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn resume(&mut self) -> anyhow::Result<()> {
        self.resumes += 1;
        if self.unavailable {
            anyhow::bail!("offline device unavailable");
        }
        self.ready = true;
        Ok(())
    }

    fn schedule(&mut self, tone: ToneParams) {
        self.tones.push(tone);
    }

    fn close(&mut self) {
        self.ready = false;
        self.tones.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ToneId, Waveform};
    use crate::audio_api::CancelToken;
    use approx::assert_relative_eq;

    fn tone(start: f64, duration: f64) -> ToneParams {
        ToneParams {
            id: ToneId::next(),
            frequency: 220.0,
            wave: Waveform::Sine,
            start,
            duration,
            level: 0.2,
            cancel: CancelToken::new(),
        }
    }

    #[test]
    fn resume_and_clock() {
        let mut device = OfflineDevice::new();
        assert!(!device.is_ready());
        device.resume().unwrap();
        assert!(device.is_ready());
        device.advance(1.5);
        device.advance(-3.0);
        assert_eq!(device.now(), 1.5);
        assert!(OfflineDevice::unavailable().resume().is_err());
    }

    #[test]
    fn render_skips_cancelled_tones() {
        let mut device = OfflineDevice::new();
        device.schedule(tone(0.0, 0.1));
        let late = tone(0.2, 0.1);
        let token = late.cancel.clone();
        device.schedule(late);
        assert_relative_eq!(device.end_time(), 0.3);

        token.cancel();
        assert_eq!(device.live_tones().count(), 1);
        let samples = device.render(1000);
        assert_eq!(samples.len(), 100);
        assert!(samples.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn writes_a_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut device = OfflineDevice::new();
        device.schedule(tone(0.0, 0.25));
        let written = device.write_wav(&path, 8000).unwrap();
        assert_eq!(written, 2000);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 2000);
    }

    #[test]
    fn close_forgets_everything() {
        let mut device = OfflineDevice::new();
        device.resume().unwrap();
        device.schedule(tone(0.0, 1.0));
        device.close();
        assert!(!device.is_ready());
        assert!(device.tones().is_empty());
    }
}
