//! The playback service: two channels (music, sfx) gated by a runtime mode,
//! fed by the sequence scheduler and song walker.

use std::cell::OnceCell;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

mod channel;
mod mode;

pub use channel::{ActiveTone, Channel, ChannelRegistry};
pub use mode::AudioMode;

use crate::audio::{OutputDevice, ToneId, Waveform};
use crate::audio_api::{CancelToken, ToneParams};
use crate::config::AudioConfig;
use crate::error::MusicError;
use crate::music::{
    MusicData, Overrides, Scale, Sequence, Song, ToneRequest, ToneSink, parse_root, schedule_sequence,
    schedule_song,
};

/// Peak amplitude of a tone at full channel volume.
pub const TONE_LEVEL: f32 = 0.2;

/// Per-call settings for the `play_*_with` entry points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayOptions {
    pub scale: Option<Scale>,
    pub tempo: Option<f64>,
    pub wave: Option<Waveform>,
}

impl PlayOptions {
    // empty strings count as "no override"
    pub fn with_scale(scale: Option<&str>) -> Self {
        Self {
            scale: scale.filter(|s| !s.trim().is_empty()).map(Scale::from_name),
            ..Self::default()
        }
    }
}

// Registers each tone with its channel, then hands it to the device. The
// order matters: a tone is always stoppable before it can sound.
struct Emitter<'a, D: OutputDevice> {
    device: &'a mut D,
    registry: &'a mut ChannelRegistry,
    level: f32,
}

impl<D: OutputDevice> ToneSink for Emitter<'_, D> {
    fn emit(&mut self, request: ToneRequest) {
        let tone = ToneParams {
            id: ToneId::next(),
            frequency: request.frequency as f32,
            wave: request.wave,
            start: request.start,
            duration: request.duration,
            level: self.level,
            cancel: CancelToken::new(),
        };
        self.registry.register(&tone);
        self.device.schedule(tone);
    }
}

/// What a play call resolved to once its data was found.
enum Playable<'a> {
    Sequence { sequence: &'a Sequence, root: i32 },
    Song(&'a Song),
}

/// The one audio service object an application holds.
///
/// Everything here runs on the caller's thread; the device's driver does the
/// actual sounding. Music data is loaded on first use and kept for the life
/// of the manager (a failed load is kept too, as an empty document).
pub struct AudioManager<D: OutputDevice> {
    device: D,
    config: AudioConfig,
    mode: AudioMode,
    music: ChannelRegistry,
    sfx: ChannelRegistry,
    data_path: Option<PathBuf>,
    data: OnceCell<MusicData>,
    rng: StdRng,
}

impl<D: OutputDevice> AudioManager<D> {
    pub fn new(device: D, data_path: impl Into<PathBuf>, config: AudioConfig) -> Self {
        Self::build(device, Some(data_path.into()), OnceCell::new(), config)
    }

    pub fn with_data(device: D, data: MusicData, config: AudioConfig) -> Self {
        Self::build(device, None, OnceCell::from(data), config)
    }

    fn build(device: D, data_path: Option<PathBuf>, data: OnceCell<MusicData>, config: AudioConfig) -> Self {
        Self {
            device,
            config: config.sanitized(),
            mode: AudioMode::default(),
            music: ChannelRegistry::default(),
            sfx: ChannelRegistry::default(),
            data_path,
            data,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fix the random source used by octave-split `random`.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn data(&self) -> &MusicData {
        self.data.get_or_init(|| load_data(self.data_path.as_ref()))
    }

    /// Live tones owned by `channel`, not counting ones that played out.
    pub fn active_tones(&mut self, channel: Channel) -> usize {
        let now = self.device.now();
        let registry = self.registry_mut(channel);
        registry.prune(now);
        registry.len()
    }

    fn registry_mut(&mut self, channel: Channel) -> &mut ChannelRegistry {
        match channel {
            Channel::Music => &mut self.music,
            Channel::Sfx => &mut self.sfx,
        }
    }

    pub fn set_mode(&mut self, mode: AudioMode) {
        if mode == self.mode {
            return;
        }
        log::info!(target: "seqtone::player", "audio mode {} -> {}", self.mode, mode);
        self.mode = mode;
        if !mode.allows(Channel::Music) {
            self.stop_channel(Channel::Music);
        }
        if !mode.allows(Channel::Sfx) {
            self.stop_channel(Channel::Sfx);
        }
    }

    pub fn set_defaults(&mut self, music_volume: f32, sfx_volume: f32, wave: Option<&str>) {
        self.config = AudioConfig {
            music_volume,
            sfx_volume,
            default_wave: wave.map(str::to_string),
            ..self.config.clone()
        }
        .sanitized();
    }

    pub fn stop_channel(&mut self, channel: Channel) -> usize {
        let stopped = self.registry_mut(channel).stop();
        if stopped > 0 {
            log::debug!(target: "seqtone::player", "stopped {stopped} {channel} tones");
        }
        stopped
    }

    pub fn stop_music(&mut self) {
        self.stop_channel(Channel::Music);
    }

    pub fn stop_sfx(&mut self) {
        self.stop_channel(Channel::Sfx);
    }

    // ignores the mode on purpose
    pub fn stop_all(&mut self) {
        self.stop_channel(Channel::Music);
        self.stop_channel(Channel::Sfx);
    }

    /// Best-effort resume for "needs a user gesture first" hosts. Failures are
    /// logged and retried on the next gesture.
    pub fn on_user_gesture(&mut self) {
        if self.device.is_ready() {
            return;
        }
        if let Err(e) = self.device.resume() {
            log::warn!(target: "seqtone::player", "could not resume output device: {e:#}");
        }
    }

    /// Stop both channels and release the device.
    pub fn shutdown(&mut self) {
        self.stop_all();
        self.device.close();
        log::info!(target: "seqtone::player", "audio shut down");
    }

    pub fn play_song(&mut self, name: &str, scale: Option<&str>) -> anyhow::Result<Option<f64>> {
        self.play_song_with(name, PlayOptions::with_scale(scale))
    }

    pub fn play_sequence(&mut self, name: &str, root: &str, scale: Option<&str>) -> anyhow::Result<Option<f64>> {
        self.play_sequence_with(name, root, PlayOptions::with_scale(scale))
    }

    pub fn play_sfx(&mut self, name: &str, root: &str, scale: Option<&str>) -> anyhow::Result<Option<f64>> {
        self.play_sfx_with(name, root, PlayOptions::with_scale(scale))
    }

    pub fn play_song_with(&mut self, name: &str, options: PlayOptions) -> anyhow::Result<Option<f64>> {
        self.play(Channel::Music, name, options, |data| {
            let song = data.song(name)?;
            if song.steps().is_empty() {
                return Err(MusicError::EmptySong(name.to_string()));
            }
            Ok(Playable::Song(song))
        })
    }

    pub fn play_sequence_with(&mut self, name: &str, root: &str, options: PlayOptions) -> anyhow::Result<Option<f64>> {
        self.play(Channel::Music, name, options, |data| resolve_sequence(data, name, root))
    }

    /// Sound effects take a bare sequence, or a song explicitly marked
    /// `"sfx": true`. Plain list songs are music only.
    pub fn play_sfx_with(&mut self, name: &str, root: &str, options: PlayOptions) -> anyhow::Result<Option<f64>> {
        self.play(Channel::Sfx, name, options, |data| {
            if data.sequences.contains_key(name) {
                return resolve_sequence(data, name, root);
            }
            match data.songs.get(name) {
                Some(song) if song.is_sfx() && !song.steps().is_empty() => Ok(Playable::Song(song)),
                Some(_) => Err(MusicError::NotSfx(name.to_string())),
                None => Err(MusicError::UnknownSequence(name.to_string())),
            }
        })
    }

    // Shared body of every play call: mode gate, data lookup, device, stop the
    // channel's previous stream, schedule. Nothing changes unless the lookup
    // succeeds.
    fn play<F>(&mut self, channel: Channel, name: &str, options: PlayOptions, resolve: F) -> anyhow::Result<Option<f64>>
    where
        F: for<'a> FnOnce(&'a MusicData) -> Result<Playable<'a>, MusicError>,
    {
        if !self.mode.allows(channel) {
            log::debug!(target: "seqtone::player", "{channel} blocked by mode {}, not playing {name}", self.mode);
            return Ok(None);
        }

        let Self { device, config, music, sfx, data_path, data, rng, .. } = self;
        let data = data.get_or_init(|| load_data(data_path.as_ref()));
        let playable = match resolve(data) {
            Ok(playable) => playable,
            Err(e) => {
                log::warn!(target: "seqtone::player", "not playing {name} on {channel}: {e}");
                return Ok(None);
            }
        };

        if !device.is_ready() {
            device.resume()?;
        }

        let registry = match channel {
            Channel::Music => music,
            Channel::Sfx => sfx,
        };
        registry.stop();

        let overrides = Overrides {
            scale: options.scale,
            tempo: options.tempo,
            wave: options.wave.or_else(|| config.default_wave()),
            ..Overrides::default()
        };
        let start = device.now() + config.schedule_lead;
        let mut emitter = Emitter {
            device,
            registry,
            level: TONE_LEVEL * config.volume(channel),
        };
        let duration = match playable {
            Playable::Sequence { sequence, root } => {
                schedule_sequence(data, sequence, root, start, &overrides, &mut emitter, rng)
            }
            Playable::Song(song) => schedule_song(data, song, start, &overrides, &mut emitter, rng),
        };

        log::info!(
            target: "seqtone::player",
            "{channel}: {name} scheduled, {} tones over {duration:.2}s",
            emitter.registry.len()
        );
        Ok(Some(duration))
    }
}

fn resolve_sequence<'a>(data: &'a MusicData, name: &str, root: &str) -> Result<Playable<'a>, MusicError> {
    let sequence = data.sequence(name)?;
    // a dangling pattern reference makes the whole call a no-op
    data.notes_for(sequence)?;
    let root = parse_root(root).ok_or_else(|| MusicError::InvalidRoot(root.to_string()))?;
    Ok(Playable::Sequence { sequence, root })
}

fn load_data(path: Option<&PathBuf>) -> MusicData {
    path.map(|p| MusicData::load_or_empty(p)).unwrap_or_default()
}
