use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use crate::audio::{ToneId, Waveform};

// Shared flag between the control side (channel registry) and the driver.
// Once set it never clears; the driver checks it before a tone starts and
// while it sounds.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// One scheduled tone, as the driver sees it. Times are seconds on the
// device clock.
#[derive(Clone, Debug)]
pub struct ToneParams {
    pub id: ToneId,
    pub frequency: f32,
    pub wave: Waveform,
    pub start: f64,
    pub duration: f64,
    pub level: f32,
    pub cancel: CancelToken,
}

impl ToneParams {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // Queue a tone; the engine starts it when the clock reaches `start`
    Schedule(ToneParams),

    // Drop everything pending or sounding, used when the device closes
    Clear,
}
