use std::f32::consts::TAU;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" => Waveform::Sine,
            "sawtooth" | "saw" => Waveform::Sawtooth,
            "triangle" => Waveform::Triangle,
            _ => Waveform::Square,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    // phase is in radians, 0..TAU
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase < std::f32::consts::PI { 1.0 } else { -1.0 }
            }
            Waveform::Sawtooth => phase / std::f32::consts::PI - 1.0,
            Waveform::Triangle => {
                let x = phase / TAU;
                1.0 - 4.0 * (x - 0.5).abs()
            }
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
