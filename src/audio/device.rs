use crate::audio_api::ToneParams;

/// The host output the engine schedules against.
///
/// Implementations own the actual sounding: `schedule` only hands over a
/// tone record, and the device's own driver starts it once its clock reaches
/// the tone's start time (unless the tone was cancelled first).
pub trait OutputDevice {
    /// Monotonic device clock in seconds.
    fn now(&self) -> f64;

    fn is_ready(&self) -> bool;

    /// Acquire and/or resume the device. Idempotent once ready.
    fn resume(&mut self) -> anyhow::Result<()>;

    fn schedule(&mut self, tone: ToneParams);

    /// Release the device. Anything pending or sounding is dropped.
    fn close(&mut self);
}
