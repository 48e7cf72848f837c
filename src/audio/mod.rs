use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, ToneParams};

mod device;
mod engine;
mod offline;
mod tone_id;
mod voice;
mod wave;

pub use device::OutputDevice;
pub use engine::Engine;
pub use offline::OfflineDevice;
pub use tone_id::ToneId;
pub use voice::Envelope;
pub use wave::Waveform;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    output_stream: cpal::Stream,
}

impl AudioHandle {
    // The queue is unbounded so a long song is never cut short while the
    // callback catches up; the callback itself only takes what fits.
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.send(cmd).is_err() {
            log::warn!(target: "seqtone::audio", "output stream is gone, dropping command");
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::unbounded::<AudioCommand>();

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate().into();
    let channels = config.channels() as usize;
    let clock = Arc::new(AtomicU64::new(0));

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let engine = Engine::new(sample_rate, clock.clone());
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, engine, channels)?;
            output_stream.play().context("failed to play output stream")?;
            log::info!(target: "seqtone::audio", "output stream open: {sample_rate} Hz, {channels} channels");

            Ok(AudioHandle {
                tx,
                clock,
                sample_rate,
                output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let err_fn = |err| log::error!(target: "seqtone::audio", "audio output stream error: {err}");
    let mut mono = vec![0.0f32; 8192];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            engine.drain(&rx); // set up command handling

            let n_frames = data.len() / channels;
            if mono.len() < n_frames {
                mono.resize(n_frames, 0.0); // only if the host hands us an unusually big block
            }
            let block = &mut mono[..n_frames];
            engine.render_block(block);
            for (frame, sample) in data.chunks_exact_mut(channels).zip(block.iter()) {
                frame.fill(*sample);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// The live output device. The stream is only opened on the first
/// `resume`, so constructing one is free and never fails.
#[derive(Default)]
pub struct CpalDevice {
    handle: Option<AudioHandle>,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputDevice for CpalDevice {
    fn now(&self) -> f64 {
        self.handle.as_ref().map_or(0.0, AudioHandle::now)
    }

    fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    fn resume(&mut self) -> anyhow::Result<()> {
        match &self.handle {
            Some(handle) => handle.output_stream.play().context("failed to resume output stream"),
            None => {
                self.handle = Some(start_audio()?);
                Ok(())
            }
        }
    }

    fn schedule(&mut self, tone: ToneParams) {
        match &self.handle {
            Some(handle) => handle.send(AudioCommand::Schedule(tone)),
            None => log::warn!(target: "seqtone::audio", "device not ready, dropping {}", tone.id),
        }
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.send(AudioCommand::Clear);
            log::info!(target: "seqtone::audio", "output stream closed");
        }
    }
}
