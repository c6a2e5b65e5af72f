//! Avatar profiles - every tunable constant as data
//!
//! Three iterations of the avatar exist as presets of one engine rather
//! than as separate code paths:
//!
//! - `classic`: first glitch iteration (full-rate backdrop, DPR cap 2, dense grain)
//! - `optimized`: performance iteration (30 fps backdrop, DPR cap 1, cached slats)
//! - `expressive`: latest iteration (smaller rotation jumps, frequent scale jumps,
//!   wider jaw swing)
//!
//! Profiles load from JSON; any missing field falls back to its default.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{HeadroomError, HeadroomResult};

/// Intensity smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Fraction of the remaining distance covered per 60 Hz frame
    pub rate: f32,
    /// Distance below which the value snaps onto its target
    pub snap_epsilon: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            rate: 0.18,
            snap_epsilon: 0.005,
        }
    }
}

/// Talking cycle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkConfig {
    /// Speech intensity above this counts as speaking
    pub threshold: f32,
    /// Open/close cycles per second at the lowest intensity
    pub min_hz: f32,
    /// Open/close cycles per second at full intensity
    pub max_hz: f32,
    /// Randomness of the cycle rate [0.0 - 1.0]
    pub jitter: f32,
    /// Envelope rise rate per 60 Hz frame
    pub attack: f32,
    /// Envelope fall rate per 60 Hz frame
    pub release: f32,
    /// Exponent mapping intensity onto the cycle rate
    pub rate_curve: f32,
    /// Phase decay per second while silent
    pub phase_decay: f32,
    /// Exponent applied to the chatter waveform
    pub chatter_exponent: f32,
    /// Exponent applied to the envelope
    pub envelope_exponent: f32,
    /// Envelope level below which a silent mouth settles completely
    pub settle_epsilon: f32,
}

impl Default for TalkConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            min_hz: 4.0,
            max_hz: 9.0,
            jitter: 0.2,
            attack: 0.25,
            release: 0.35,
            rate_curve: 0.6,
            phase_decay: 3.0,
            chatter_exponent: 0.9,
            envelope_exponent: 0.8,
            settle_epsilon: 1e-3,
        }
    }
}

impl TalkConfig {
    /// Jitter scale applied to the cycle rate
    pub const JITTER_SCALE: f32 = 0.15;
    /// Lowest cycle rate after jitter
    pub const MIN_CYCLE_HZ: f32 = 0.1;

    /// Bounds the cycle rate can take while speaking
    pub fn hz_bounds(&self) -> (f32, f32) {
        let spread = self.jitter * Self::JITTER_SCALE;
        (
            (self.min_hz * (1.0 - spread)).max(Self::MIN_CYCLE_HZ),
            self.max_hz * (1.0 + spread),
        )
    }
}

/// Jaw articulation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JawConfig {
    /// Response speed [0.0 - 1.0], higher is snappier
    pub speed: f32,
    /// Maximum lower jaw opening (radians)
    pub bottom_max: f32,
    /// Maximum upper jaw tip (radians, negative tips upward)
    pub top_max: f32,
}

impl Default for JawConfig {
    fn default() -> Self {
        Self {
            speed: 0.85,
            bottom_max: 0.55,
            top_max: -0.20,
        }
    }
}

impl JawConfig {
    /// Bigger swing on both jaws
    pub fn wide() -> Self {
        Self {
            speed: 0.92,
            bottom_max: 0.60,
            top_max: -0.28,
        }
    }
}

/// Upper jaw idle bias and travel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpperJawConfig {
    /// Idle rotation offset so the upper jaw peeks out (radians)
    pub bias_rot_x: f32,
    /// Idle Y offset (scene units)
    pub bias_pos_y: f32,
    /// Idle Z offset (scene units)
    pub bias_pos_z: f32,
    /// Y travel at full opening
    pub move_y: f32,
    /// Z travel at full opening
    pub move_z: f32,
}

impl Default for UpperJawConfig {
    fn default() -> Self {
        Self {
            bias_rot_x: -0.15,
            bias_pos_y: -0.006,
            bias_pos_z: 0.0,
            move_y: -0.010,
            move_z: 0.0,
        }
    }
}

/// Tongue wobble (disabled unless explicitly enabled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TongueConfig {
    pub enabled: bool,
    /// Vertical amplitude at full envelope
    pub amplitude: f32,
    /// Wobble angular speed (radians per second of elapsed time)
    pub speed: f32,
}

impl Default for TongueConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.12,
            speed: 0.012,
        }
    }
}

/// Glitch perturbation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub enable_rotation_jumps: bool,
    /// Largest single rotation jump (degrees)
    pub max_jump_degrees: f32,
    /// Period of the rotation jump timer (milliseconds)
    pub jump_interval_ms: u64,
    pub enable_scale_jump: bool,
    /// Largest scale jump as a percentage of the base scale
    pub max_scale_jump_percent: f32,
    /// Chance of a scale jump per activation (percent)
    pub scale_jump_chance: f32,
    /// Fraction of the remaining distance recovered per 60 Hz frame at rest
    pub return_speed: f32,
    /// Rest scale of the root node
    pub base_scale: f32,
    /// Smoothed intensity above which the glitch is active
    pub activation_epsilon: f32,
    /// Distance from rest below which rotation and scale snap to rest
    pub rest_epsilon: f32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            enable_rotation_jumps: true,
            max_jump_degrees: 45.0,
            jump_interval_ms: 600,
            enable_scale_jump: true,
            max_scale_jump_percent: 18.0,
            scale_jump_chance: 10.0,
            return_speed: 0.12,
            base_scale: 5.0,
            activation_epsilon: 0.01,
            rest_epsilon: 0.001,
        }
    }
}

impl GlitchConfig {
    /// Rotation offset bound (radians)
    pub const ROTATION_LIMIT: f32 = FRAC_PI_2;

    pub fn jump_interval(&self) -> Duration {
        Duration::from_millis(self.jump_interval_ms)
    }
}

/// Direction of the base gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientAxis {
    /// Top to bottom
    #[default]
    Vertical,
    /// Top-left to bottom-right
    Diagonal,
}

/// Procedural backdrop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Hard cap on drawn frames per second
    pub target_fps: u32,
    /// Cap on the device pixel ratio used for the backing surface
    pub dpr_cap: f32,
    pub gradient_axis: GradientAxis,
    /// Base alpha of the radial bloom, 0 disables it
    pub bloom_alpha: f32,
    pub slat_alpha: f32,
    pub slat_alpha_gain: f32,
    /// Slat scroll speed in pixels per second
    pub slat_speed: f32,
    pub slat_speed_gain: f32,
    /// Largest slat layer tilt (degrees)
    pub slat_max_angle_deg: f32,
    /// Shortest interval between slat tilt retargets (seconds)
    pub slat_retarget_min_s: f32,
    /// Longest interval between slat tilt retargets (seconds)
    pub slat_retarget_max_s: f32,
    /// Fraction of the remaining tilt covered per drawn frame at target fps
    pub slat_ease: f32,
    /// Slat tile recolour period (milliseconds)
    pub tile_refresh_ms: u64,
    pub band_alpha: f32,
    pub band_alpha_gain: f32,
    /// Scanline pitch in device pixels
    pub scanline_pitch: u32,
    pub scanline_alpha: f32,
    pub scanline_alpha_gain: f32,
    /// Pixels per grain speckle at zero intensity
    pub noise_density_div: f32,
    pub grain_intensity_gain: f32,
    pub grain_alpha: f32,
    pub grain_alpha_gain: f32,
    pub grain_size: f32,
    pub grain_size_spread: f32,
    pub grain_size_gain: f32,
    /// Edge darkening of the vignette [0.0 - 1.0]
    pub vignette_alpha: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            dpr_cap: 1.0,
            gradient_axis: GradientAxis::Vertical,
            bloom_alpha: 0.03,
            slat_alpha: 0.6,
            slat_alpha_gain: 0.15,
            slat_speed: 35.0,
            slat_speed_gain: 120.0,
            slat_max_angle_deg: 25.0,
            slat_retarget_min_s: 2.0,
            slat_retarget_max_s: 4.0,
            slat_ease: 0.05,
            tile_refresh_ms: 250,
            band_alpha: 0.12,
            band_alpha_gain: 0.12,
            scanline_pitch: 3,
            scanline_alpha: 0.10,
            scanline_alpha_gain: 0.05,
            noise_density_div: 24_000.0,
            grain_intensity_gain: 1.0,
            grain_alpha: 0.08,
            grain_alpha_gain: 0.06,
            grain_size: 0.6,
            grain_size_spread: 1.2,
            grain_size_gain: 1.5,
            vignette_alpha: 0.30,
        }
    }
}

impl BackdropConfig {
    /// Smallest pixels-per-grain divisor; denser grain stalls the frame
    pub const MIN_NOISE_DENSITY_DIV: f32 = 500.0;

    /// First iteration look: full-rate, dense grain, diagonal gradient
    pub fn classic() -> Self {
        Self {
            target_fps: 60,
            dpr_cap: 2.0,
            gradient_axis: GradientAxis::Diagonal,
            bloom_alpha: 0.0,
            slat_max_angle_deg: 13.5,
            slat_retarget_min_s: 3.0,
            slat_retarget_max_s: 7.0,
            slat_ease: 0.02,
            band_alpha: 0.14,
            band_alpha_gain: 0.14,
            scanline_pitch: 2,
            scanline_alpha: 0.12,
            scanline_alpha_gain: 0.06,
            noise_density_div: 9_000.0,
            grain_intensity_gain: 2.0,
            grain_alpha: 0.12,
            grain_alpha_gain: 0.10,
            grain_size: 0.8,
            grain_size_spread: 1.6,
            grain_size_gain: 2.0,
            vignette_alpha: 0.35,
            ..Self::default()
        }
    }

    pub fn tile_refresh(&self) -> Duration {
        Duration::from_millis(self.tile_refresh_ms)
    }
}

/// Post-processing parameter scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFxConfig {
    pub glitch_strength: f32,
    pub chromatic_strength: f32,
    pub scanline_density_base: f32,
    pub scanline_density_gain: f32,
    pub scanline_opacity: f32,
    pub enable_emissive: bool,
    pub emissive_intensity: f32,
}

impl Default for PostFxConfig {
    fn default() -> Self {
        Self {
            glitch_strength: 0.18,
            chromatic_strength: 0.004,
            scanline_density_base: 0.6,
            scanline_density_gain: 0.4,
            scanline_opacity: 0.5,
            enable_emissive: true,
            emissive_intensity: 0.7,
        }
    }
}

/// Names of the scene nodes the engine animates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeNames {
    pub root: String,
    pub lower_jaw: String,
    pub upper_jaw: String,
    pub tongue: String,
}

impl Default for NodeNames {
    fn default() -> Self {
        Self {
            root: "max_headroom".to_string(),
            lower_jaw: "max_headroom_denture_bottom".to_string(),
            upper_jaw: "max_headroom_denture_top".to_string(),
            tongue: "max_headroom_tongue".to_string(),
        }
    }
}

/// Complete avatar profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarProfile {
    pub name: String,
    pub smoothing: SmoothingConfig,
    pub talk: TalkConfig,
    pub jaw: JawConfig,
    pub upper_jaw: UpperJawConfig,
    pub tongue: TongueConfig,
    pub glitch: GlitchConfig,
    pub backdrop: BackdropConfig,
    pub post_fx: PostFxConfig,
    pub nodes: NodeNames,
}

impl Default for AvatarProfile {
    fn default() -> Self {
        Self::optimized()
    }
}

impl AvatarProfile {
    /// Preset names accepted by [`AvatarProfile::preset`]
    pub const PRESETS: [&'static str; 3] = ["classic", "optimized", "expressive"];

    /// First glitch iteration
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            backdrop: BackdropConfig::classic(),
            ..Self::optimized()
        }
    }

    /// Performance-tuned iteration
    pub fn optimized() -> Self {
        Self {
            name: "optimized".to_string(),
            smoothing: SmoothingConfig::default(),
            talk: TalkConfig::default(),
            jaw: JawConfig::default(),
            upper_jaw: UpperJawConfig::default(),
            tongue: TongueConfig::default(),
            glitch: GlitchConfig::default(),
            backdrop: BackdropConfig::default(),
            post_fx: PostFxConfig::default(),
            nodes: NodeNames::default(),
        }
    }

    /// Latest iteration: calmer rotation, livelier scale and jaw
    pub fn expressive() -> Self {
        Self {
            name: "expressive".to_string(),
            jaw: JawConfig::wide(),
            upper_jaw: UpperJawConfig {
                bias_pos_y: -0.0105,
                ..UpperJawConfig::default()
            },
            glitch: GlitchConfig {
                max_jump_degrees: 20.0,
                scale_jump_chance: 60.0,
                ..GlitchConfig::default()
            },
            ..Self::optimized()
        }
    }

    /// Resolve a preset by name
    pub fn preset(name: &str) -> HeadroomResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::classic()),
            "optimized" | "default" => Ok(Self::optimized()),
            "expressive" => Ok(Self::expressive()),
            _ => Err(HeadroomError::UnknownPreset(name.to_string())),
        }
    }

    /// Parse and validate a profile from JSON
    pub fn from_json_str(json: &str) -> HeadroomResult<Self> {
        let profile: AvatarProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load and validate a profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> HeadroomResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> HeadroomResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every tunable against its valid range
    pub fn validate(&self) -> HeadroomResult<()> {
        unit_rate("smoothing.rate", self.smoothing.rate)?;
        positive("smoothing.snap_epsilon", self.smoothing.snap_epsilon)?;

        let talk = &self.talk;
        if !(0.0..1.0).contains(&talk.threshold) {
            return Err(HeadroomError::invalid("talk.threshold", "must be in [0, 1)"));
        }
        positive("talk.min_hz", talk.min_hz)?;
        if talk.max_hz < talk.min_hz {
            return Err(HeadroomError::invalid("talk.max_hz", "must be >= talk.min_hz"));
        }
        positive("talk.max_hz", talk.max_hz)?;
        if !(0.0..=1.0).contains(&talk.jitter) {
            return Err(HeadroomError::invalid("talk.jitter", "must be in [0, 1]"));
        }
        unit_rate("talk.attack", talk.attack)?;
        unit_rate("talk.release", talk.release)?;
        positive("talk.rate_curve", talk.rate_curve)?;
        positive("talk.phase_decay", talk.phase_decay)?;
        positive("talk.settle_epsilon", talk.settle_epsilon)?;

        unit_rate("jaw.speed", self.jaw.speed)?;

        let glitch = &self.glitch;
        if glitch.jump_interval_ms == 0 {
            return Err(HeadroomError::invalid("glitch.jump_interval_ms", "must be > 0"));
        }
        non_negative("glitch.max_jump_degrees", glitch.max_jump_degrees)?;
        if !(0.0..=100.0).contains(&glitch.scale_jump_chance) {
            return Err(HeadroomError::invalid(
                "glitch.scale_jump_chance",
                "must be in [0, 100]",
            ));
        }
        non_negative("glitch.max_scale_jump_percent", glitch.max_scale_jump_percent)?;
        unit_rate("glitch.return_speed", glitch.return_speed)?;
        positive("glitch.base_scale", glitch.base_scale)?;
        positive("glitch.rest_epsilon", glitch.rest_epsilon)?;

        let backdrop = &self.backdrop;
        if backdrop.target_fps == 0 {
            return Err(HeadroomError::invalid("backdrop.target_fps", "must be >= 1"));
        }
        positive("backdrop.dpr_cap", backdrop.dpr_cap)?;
        non_negative("backdrop.slat_max_angle_deg", backdrop.slat_max_angle_deg)?;
        non_negative("backdrop.slat_retarget_min_s", backdrop.slat_retarget_min_s)?;
        non_negative("backdrop.slat_retarget_max_s", backdrop.slat_retarget_max_s)?;
        if backdrop.slat_retarget_max_s < backdrop.slat_retarget_min_s {
            return Err(HeadroomError::invalid(
                "backdrop.slat_retarget_max_s",
                "must be >= slat_retarget_min_s",
            ));
        }
        unit_rate("backdrop.slat_ease", backdrop.slat_ease)?;
        if backdrop.scanline_pitch == 0 {
            return Err(HeadroomError::invalid("backdrop.scanline_pitch", "must be >= 1"));
        }
        if !(backdrop.noise_density_div >= BackdropConfig::MIN_NOISE_DENSITY_DIV) {
            return Err(HeadroomError::invalid(
                "backdrop.noise_density_div",
                format!("must be >= {}", BackdropConfig::MIN_NOISE_DENSITY_DIV),
            ));
        }
        non_negative("backdrop.grain_intensity_gain", backdrop.grain_intensity_gain)?;
        if !(0.0..=1.0).contains(&backdrop.vignette_alpha) {
            return Err(HeadroomError::invalid("backdrop.vignette_alpha", "must be in [0, 1]"));
        }

        Ok(())
    }
}

fn unit_rate(field: &'static str, value: f32) -> HeadroomResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(HeadroomError::invalid(field, format!("{value} not in (0, 1]")))
    }
}

fn positive(field: &'static str, value: f32) -> HeadroomResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(HeadroomError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> HeadroomResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(HeadroomError::invalid(field, format!("{value} must be finite and >= 0")))
    }
}
