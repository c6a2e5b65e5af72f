//! Per-frame engine output - what the external render loop reads

use headroom_backdrop::BackdropTick;
use headroom_core::{FrameTime, Intensity, PostFxConfig};
use headroom_motion::{GlitchState, MouthFrame};

/// Scalar inputs for the host's post-processing passes.
///
/// The shaders themselves live with the host; these are only the values
/// they are driven with, all derived from the smoothed glitch intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostFxParams {
    /// Glitch pass is worth enabling this frame
    pub glitch_active: bool,
    pub glitch_strength: f32,
    /// Chromatic aberration offset (UV units)
    pub chromatic_offset: f32,
    pub scanline_density: f32,
    pub scanline_opacity: f32,
    /// Emissive glow on the avatar material, 0 when disabled
    pub emissive_intensity: f32,
}

impl PostFxParams {
    /// Glitch pass threshold on the smoothed intensity
    pub const ACTIVE_EPSILON: f32 = 0.01;

    pub fn derive(intensity: f32, config: &PostFxConfig) -> Self {
        let i = Intensity::new(intensity).get();
        Self {
            glitch_active: i > Self::ACTIVE_EPSILON,
            glitch_strength: i * config.glitch_strength,
            chromatic_offset: i * config.chromatic_strength,
            scanline_density: config.scanline_density_base + config.scanline_density_gain * i,
            scanline_opacity: config.scanline_opacity * i,
            emissive_intensity: if config.enable_emissive {
                i * config.emissive_intensity
            } else {
                0.0
            },
        }
    }
}

/// Everything one engine frame produced
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput {
    pub now: FrameTime,
    pub dt: f32,
    /// Step input as last reported by the voice layer
    pub glitch_target: f32,
    /// Smoothed glitch intensity
    pub glitch_actual: f32,
    pub speech: f32,
    pub mouth: MouthFrame,
    pub glitch: GlitchState,
    /// Rotation jump periods that fired this frame
    pub jumps_fired: u32,
    pub backdrop: BackdropTick,
    pub post_fx: PostFxParams,
}
