use std::fmt;

use serde::{Deserialize, Serialize};

use super::channel::Channel;

/// Which channels are allowed to make sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AudioMode {
    #[default]
    On,
    Off,
    /// music only
    Music,
    /// sound effects only
    Sfx,
}

impl AudioMode {
    // anything unrecognized means "on"
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" => AudioMode::Off,
            "music" => AudioMode::Music,
            "sfx" => AudioMode::Sfx,
            _ => AudioMode::On,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AudioMode::On => "on",
            AudioMode::Off => "off",
            AudioMode::Music => "music",
            AudioMode::Sfx => "sfx",
        }
    }

    pub fn allows(self, channel: Channel) -> bool {
        match channel {
            Channel::Music => matches!(self, AudioMode::On | AudioMode::Music),
            Channel::Sfx => matches!(self, AudioMode::On | AudioMode::Sfx),
        }
    }

    // cycling order for the jukebox
    pub fn next(self) -> Self {
        match self {
            AudioMode::On => AudioMode::Music,
            AudioMode::Music => AudioMode::Sfx,
            AudioMode::Sfx => AudioMode::Off,
            AudioMode::Off => AudioMode::On,
        }
    }
}

impl From<&str> for AudioMode {
    fn from(name: &str) -> Self {
        AudioMode::from_name(name)
    }
}

impl From<String> for AudioMode {
    fn from(name: String) -> Self {
        AudioMode::from_name(&name)
    }
}

impl From<AudioMode> for String {
    fn from(mode: AudioMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
