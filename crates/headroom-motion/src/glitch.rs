//! Glitch perturbation - timed random jumps that always return to rest
//!
//! Two phases, switched by the smoothed glitch intensity:
//!
//! - ACTIVE: a repeating timer injects rotation jumps; one scale jump may
//!   happen on entry. Nothing eases, so each jump reads as a sudden event.
//! - REST: rotation eases to 0 and scale to the base value, then snaps.
//!
//! The perturber is the only writer of the root node's Y rotation and scale.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use headroom_core::{rate_for_dt, FrameTime, GlitchConfig};

use crate::{RepeatingTimer, SceneGraph, Vec3};

/// Perturber phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlitchPhase {
    #[default]
    Rest,
    Active,
}

impl fmt::Display for GlitchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlitchPhase::Rest => write!(f, "rest"),
            GlitchPhase::Active => write!(f, "active"),
        }
    }
}

/// Snapshot of the perturbation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchState {
    pub phase: GlitchPhase,
    /// Y rotation offset (radians), within ±ROTATION_LIMIT
    pub rotation_offset: f32,
    /// Uniform scale of the root node
    pub scale_factor: f32,
    pub has_jumped_this_activation: bool,
    pub next_jump_deadline: Option<FrameTime>,
}

/// Glitch statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlitchStats {
    /// REST→ACTIVE transitions
    pub activations: u64,
    /// Rotation jumps applied
    pub rotation_jumps: u64,
    /// Scale jumps applied
    pub scale_jumps: u64,
}

/// Glitch perturber for one avatar
#[derive(Debug)]
pub struct GlitchPerturber {
    config: GlitchConfig,
    root: String,
    phase: GlitchPhase,
    rotation_offset: f32,
    scale_factor: f32,
    has_jumped: bool,
    timer: RepeatingTimer,
    stats: GlitchStats,
    rng: StdRng,
}

impl GlitchPerturber {
    pub fn new(config: GlitchConfig, root: impl Into<String>) -> Self {
        Self::with_rng(config, root.into(), StdRng::from_entropy())
    }

    /// Deterministic jumps for tests and replays
    pub fn with_seed(config: GlitchConfig, root: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(config, root.into(), StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GlitchConfig, root: String, rng: StdRng) -> Self {
        let timer = RepeatingTimer::new(config.jump_interval());
        Self {
            scale_factor: config.base_scale,
            config,
            root,
            phase: GlitchPhase::Rest,
            rotation_offset: 0.0,
            has_jumped: false,
            timer,
            stats: GlitchStats::default(),
            rng,
        }
    }

    /// Run one frame with the smoothed glitch intensity.
    ///
    /// Phase transitions and the jump timer are tracked even when the root
    /// node is missing; only the transform writes are skipped.
    pub fn update(&mut self, actual: f32, now: FrameTime, dt: f32, scene: &mut dyn SceneGraph) {
        let active = actual > self.config.activation_epsilon;

        match (self.phase, active) {
            (GlitchPhase::Rest, true) => self.activate(now, scene),
            (GlitchPhase::Active, false) => self.deactivate(),
            _ => {}
        }

        if self.phase == GlitchPhase::Rest && scene.node(&self.root).is_some() {
            self.ease_to_rest(dt);
        }
        self.write(scene);
    }

    fn activate(&mut self, now: FrameTime, scene: &mut dyn SceneGraph) {
        self.phase = GlitchPhase::Active;
        self.has_jumped = false;
        self.timer.start(now);
        self.stats.activations += 1;
        debug!(activation = self.stats.activations, ?now, "glitch active");

        if scene.node(&self.root).is_some() {
            self.maybe_scale_jump();
        }
    }

    fn deactivate(&mut self) {
        self.phase = GlitchPhase::Rest;
        self.timer.cancel();
        debug!(
            rotation = self.rotation_offset,
            scale = self.scale_factor,
            "glitch returning to rest"
        );
    }

    fn maybe_scale_jump(&mut self) {
        if !self.config.enable_scale_jump || self.has_jumped {
            return;
        }
        let roll: f32 = self.rng.gen_range(0.0..100.0);
        if roll >= self.config.scale_jump_chance {
            return;
        }

        let base = self.config.base_scale;
        let max_fraction = magnitude(self.config.max_scale_jump_percent / 100.0);
        let fraction = self.rng.gen::<f32>() * max_fraction;
        self.scale_factor = base + fraction * base;
        self.has_jumped = true;
        self.stats.scale_jumps += 1;
        debug!(scale = self.scale_factor, "glitch scale jump");
    }

    fn rotation_jump(&mut self) {
        let max = magnitude(self.config.max_jump_degrees);
        let degrees = self.rng.gen_range(-1.0f32..=1.0) * max;
        let limit = GlitchConfig::ROTATION_LIMIT;
        self.rotation_offset = (self.rotation_offset + degrees.to_radians()).clamp(-limit, limit);
        self.stats.rotation_jumps += 1;
        trace!(degrees, rotation = self.rotation_offset, "glitch rotation jump");
    }

    fn ease_to_rest(&mut self, dt: f32) {
        let fraction = rate_for_dt(self.config.return_speed, dt);
        let epsilon = self.config.rest_epsilon;
        let base = self.config.base_scale;

        self.rotation_offset -= self.rotation_offset * fraction;
        if self.rotation_offset.abs() < epsilon {
            self.rotation_offset = 0.0;
        }

        self.scale_factor += (base - self.scale_factor) * fraction;
        if (self.scale_factor - base).abs() < epsilon {
            self.scale_factor = base;
        }
    }

    fn write(&self, scene: &mut dyn SceneGraph) {
        if let Some(node) = scene.node_mut(&self.root) {
            node.rotation.y = self.rotation_offset;
            node.scale = Vec3::splat(self.scale_factor);
        }
    }

    /// Fire any due rotation jumps. Returns how many timer periods elapsed.
    pub fn poll_timer(&mut self, now: FrameTime, scene: &mut dyn SceneGraph) -> u32 {
        let fired = self.timer.poll(now);
        if fired == 0 || !self.config.enable_rotation_jumps || scene.node(&self.root).is_none() {
            return fired;
        }

        for _ in 0..fired {
            self.rotation_jump();
        }
        self.write(scene);
        fired
    }

    /// Stop the jump timer and drop to REST. Idempotent.
    pub fn cancel(&mut self) {
        if self.timer.is_armed() {
            debug!("glitch jump timer cancelled");
        }
        self.timer.cancel();
        self.phase = GlitchPhase::Rest;
    }

    /// Cancel and put rotation and scale straight back to rest
    pub fn reset(&mut self) {
        self.cancel();
        self.rotation_offset = 0.0;
        self.scale_factor = self.config.base_scale;
        self.has_jumped = false;
    }

    pub fn phase(&self) -> GlitchPhase {
        self.phase
    }

    pub fn rotation_offset(&self) -> f32 {
        self.rotation_offset
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn is_at_rest(&self) -> bool {
        self.rotation_offset == 0.0 && self.scale_factor == self.config.base_scale
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn state(&self) -> GlitchState {
        GlitchState {
            phase: self.phase,
            rotation_offset: self.rotation_offset,
            scale_factor: self.scale_factor,
            has_jumped_this_activation: self.has_jumped,
            next_jump_deadline: self.timer.deadline(),
        }
    }

    pub fn stats(&self) -> GlitchStats {
        self.stats
    }

    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }
}

/// Sampling bound for a configured spread: NaN is zero, infinity is `f32::MAX`
fn magnitude(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.abs().min(f32::MAX)
    }
}
