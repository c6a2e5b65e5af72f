//! Intensity signals - normalized control scalars
//!
//! The voice layer reports two scalars: a step-like glitch intensity and a
//! near-continuous speech intensity. Both are clamped to [0, 1] at the
//! boundary so nothing downstream sees degenerate input.

use serde::{Deserialize, Serialize};

/// A control scalar clamped to [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Intensity(f32);

impl Intensity {
    pub const ZERO: Intensity = Intensity(0.0);
    pub const FULL: Intensity = Intensity(1.0);

    /// Clamp any input into range. NaN maps to zero.
    #[inline]
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Intensity(0.0)
        } else {
            Intensity(value.clamp(0.0, 1.0))
        }
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f32> for Intensity {
    fn from(value: f32) -> Self {
        Intensity::new(value)
    }
}

impl From<f64> for Intensity {
    fn from(value: f64) -> Self {
        Intensity::new(value as f32)
    }
}

impl From<Intensity> for f32 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

/// Agent conversation mode as reported by the voice layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceMode {
    /// Agent is talking
    Speaking,
    /// Agent is listening to the user
    Listening,
}

impl VoiceMode {
    /// Glitch target implied by this mode (step function)
    pub fn glitch_target(self) -> Intensity {
        match self {
            VoiceMode::Speaking => Intensity::FULL,
            VoiceMode::Listening => Intensity::ZERO,
        }
    }
}
