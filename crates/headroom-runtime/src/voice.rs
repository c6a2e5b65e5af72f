//! Voice-layer boundary
//!
//! The voice collaborator never reaches the engine through globals. It is
//! handed something implementing `VoiceSink` and reports into it.

use headroom_core::{Intensity, VoiceMode};

/// Receiver of the voice layer's two control signals
pub trait VoiceSink {
    /// Glitch step input; 0 or 1 in practice, clamped to [0, 1]
    fn report_glitch_intensity(&mut self, value: f32);

    /// Near-continuous speech amplitude, clamped to [0, 1]
    fn report_speech_intensity(&mut self, value: f32);

    /// Agent mode transition
    fn report_voice_mode(&mut self, mode: VoiceMode) {
        self.report_glitch_intensity(mode.glitch_target().get());
        if mode == VoiceMode::Listening {
            self.report_speech_intensity(Intensity::ZERO.get());
        }
    }
}
