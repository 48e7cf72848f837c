use std::fmt;

use crate::audio_api::{CancelToken, ToneParams};
use crate::audio::ToneId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Music,
    Sfx,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Music => "music",
            Channel::Sfx => "sfx",
        })
    }
}

#[derive(Clone, Debug)]
pub struct ActiveTone {
    pub id: ToneId,
    pub end: f64,
    cancel: CancelToken,
}

/// Every tone a channel currently owns, from scheduling until it is stopped
/// or has played out.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    tones: Vec<ActiveTone>,
}

impl ChannelRegistry {
    pub fn register(&mut self, tone: &ToneParams) {
        self.tones.push(ActiveTone {
            id: tone.id,
            end: tone.end(),
            cancel: tone.cancel.clone(),
        });
    }

    /// Cancel everything and empty the registry. Tones that already finished
    /// just get a flag nobody reads any more.
    pub fn stop(&mut self) -> usize {
        for tone in &self.tones {
            tone.cancel.cancel();
        }
        let stopped = self.tones.len();
        self.tones.clear();
        stopped
    }

    // forget tones that have played out on their own
    pub fn prune(&mut self, now: f64) {
        self.tones.retain(|t| t.end > now);
    }

    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveTone> {
        self.tones.iter()
    }
}
