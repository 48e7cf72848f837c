//! Data-driven tone sequencing: scale-relative note patterns, sequences and
//! songs turned into timed tones on a shared output device, across two
//! independent channels (music and sfx) gated by a runtime mode.

pub mod audio;
pub mod audio_api;
pub mod config;
pub mod error;
pub mod music;
pub mod player;

pub use audio::{CpalDevice, OfflineDevice, OutputDevice, Waveform};
pub use config::AudioConfig;
pub use error::MusicError;
pub use music::{MusicData, Scale};
pub use player::{AudioManager, AudioMode, Channel, PlayOptions};
