use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::player::Channel;

/// Engine-wide playback defaults. Usually persisted by the host application
/// alongside the audio mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub music_volume: f32,
    pub sfx_volume: f32,
    // used when a call doesn't name a wave; beats the sequence's own wave
    pub default_wave: Option<String>,
    // seconds added to the device clock before the first tone of a stream
    pub schedule_lead: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            sfx_volume: 1.0,
            default_wave: None,
            schedule_lead: 0.05,
        }
    }
}

impl AudioConfig {
    pub fn sanitized(mut self) -> Self {
        self.music_volume = clamp_volume(self.music_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        self.default_wave = self.default_wave.filter(|w| !w.trim().is_empty());
        if !self.schedule_lead.is_finite() || self.schedule_lead < 0.0 {
            self.schedule_lead = AudioConfig::default().schedule_lead;
        }
        self
    }

    pub fn volume(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Music => self.music_volume,
            Channel::Sfx => self.sfx_volume,
        }
    }

    pub fn default_wave(&self) -> Option<Waveform> {
        self.default_wave.as_deref().map(Waveform::from_name)
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 1.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_and_drops_blank_wave() {
        let config = AudioConfig {
            music_volume: 3.0,
            sfx_volume: -1.0,
            default_wave: Some("  ".into()),
            schedule_lead: f64::NAN,
        }
        .sanitized();
        assert_eq!(config.music_volume, 1.0);
        assert_eq!(config.sfx_volume, 0.0);
        assert_eq!(config.default_wave, None);
        assert_eq!(config.schedule_lead, 0.05);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AudioConfig = serde_json::from_str(r#"{ "sfx_volume": 0.5, "default_wave": "sine" }"#).unwrap();
        assert_eq!(config.music_volume, 1.0);
        assert_eq!(config.volume(Channel::Sfx), 0.5);
        assert_eq!(config.default_wave(), Some(Waveform::Sine));
    }
}
