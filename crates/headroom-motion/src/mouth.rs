//! Mouth articulation - jaw motion from a loudness-like scalar
//!
//! There is no phoneme timing to follow. Instead a synthetic open/close
//! cycle runs while the agent is speaking, its rate rising with intensity,
//! and its depth scaled by an attack/release envelope of the intensity.
//!
//! ```text
//! speech ──► envelope (attack/release) ─────────────┐
//!        └─► cycle rate ─► phase ─► chatter ────────┴─► open ─► jaw targets
//! ```

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use headroom_core::{
    rate_for_dt, Intensity, JawConfig, NodeNames, TalkConfig, TongueConfig, UpperJawConfig,
    REFERENCE_FPS,
};

use crate::{SceneGraph, TongueWobble, Vec3};

/// Rest and current pose of one articulation point.
///
/// Rotation is about the X axis only. The rest pose is captured once, the
/// first time the node is found, and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticulationPose {
    pub rest_rotation: f32,
    pub rest_position: Vec3,
    pub rotation: f32,
    pub position: Vec3,
}

impl ArticulationPose {
    fn capture(rotation: f32, position: Vec3) -> Self {
        Self {
            rest_rotation: rotation,
            rest_position: position,
            rotation,
            position,
        }
    }
}

/// What the articulator produced this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouthFrame {
    /// Smoothed loudness envelope [0.0 - 1.0]
    pub envelope: f32,
    /// Opening amount [0.0 - 1.0]
    pub open: f32,
    /// Cycle rate used this frame
    pub hz: f32,
    pub speaking: bool,
    /// Lower jaw rotation, if the node exists
    pub lower_jaw: Option<f32>,
    /// Upper jaw rotation and position, if the node exists
    pub upper_jaw: Option<(f32, Vec3)>,
    /// Tongue Y position, if the wobble is enabled and the node exists
    pub tongue_y: Option<f32>,
}

/// Jaw articulator for one avatar
#[derive(Debug)]
pub struct MouthArticulator {
    talk: TalkConfig,
    jaw: JawConfig,
    upper: UpperJawConfig,
    lower_node: String,
    upper_node: String,
    tongue: TongueWobble,

    /// Smoothed amplitude envelope
    envelope: f32,
    /// Accumulated cycle angle (radians)
    phase: f32,
    /// Seconds of articulation so far
    elapsed: f32,
    last: MouthFrame,

    lower_pose: Option<ArticulationPose>,
    upper_pose: Option<ArticulationPose>,

    rng: StdRng,
}

impl MouthArticulator {
    pub fn new(
        talk: TalkConfig,
        jaw: JawConfig,
        upper: UpperJawConfig,
        tongue: TongueConfig,
        nodes: &NodeNames,
    ) -> Self {
        Self::with_rng(talk, jaw, upper, tongue, nodes, StdRng::from_entropy())
    }

    /// Deterministic jitter for tests and replays
    pub fn with_seed(
        talk: TalkConfig,
        jaw: JawConfig,
        upper: UpperJawConfig,
        tongue: TongueConfig,
        nodes: &NodeNames,
        seed: u64,
    ) -> Self {
        Self::with_rng(talk, jaw, upper, tongue, nodes, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        talk: TalkConfig,
        jaw: JawConfig,
        upper: UpperJawConfig,
        tongue: TongueConfig,
        nodes: &NodeNames,
        rng: StdRng,
    ) -> Self {
        Self {
            talk,
            jaw,
            upper,
            lower_node: nodes.lower_jaw.clone(),
            upper_node: nodes.upper_jaw.clone(),
            tongue: TongueWobble::new(tongue, nodes.tongue.clone()),
            envelope: 0.0,
            phase: 0.0,
            elapsed: 0.0,
            last: MouthFrame::default(),
            lower_pose: None,
            upper_pose: None,
            rng,
        }
    }

    /// Advance one frame and write jaw transforms into the scene.
    ///
    /// `speech` is clamped to [0, 1]; `dt` is the frame duration in seconds.
    pub fn update(&mut self, speech: f32, dt: f32, scene: &mut dyn SceneGraph) -> MouthFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let si = Intensity::new(speech).get();
        let speaking = si > self.talk.threshold;
        self.elapsed += dt;

        // Envelope: rate is per 60 Hz frame, scaled by the real frame length
        let target_env = if speaking { si } else { 0.0 };
        let rate = if speaking { self.talk.attack } else { self.talk.release };
        let step = (dt * REFERENCE_FPS * rate).min(1.0);
        self.envelope = (self.envelope + (target_env - self.envelope) * step).clamp(0.0, 1.0);

        // Cycle rate rises with intensity, with a touch of jitter while speaking
        let mut hz = self.talk.min_hz + (self.talk.max_hz - self.talk.min_hz) * si.powf(self.talk.rate_curve);
        if speaking && self.talk.jitter > 0.0 {
            let jitter: f32 = self.rng.gen_range(-1.0..=1.0);
            hz *= 1.0 + jitter * self.talk.jitter * TalkConfig::JITTER_SCALE;
            hz = hz.max(TalkConfig::MIN_CYCLE_HZ);
        }

        if speaking {
            self.phase = (self.phase + TAU * hz * dt).rem_euclid(TAU);
        } else {
            self.phase *= 1.0 - (dt * self.talk.phase_decay).min(1.0);
            if self.envelope < self.talk.settle_epsilon {
                // Mouth is already closed; settling the cycle is invisible
                self.envelope = 0.0;
                self.phase = 0.0;
            }
        }

        let chatter = 0.5 * (1.0 - self.phase.cos());
        let open = chatter.max(0.0).powf(self.talk.chatter_exponent)
            * self.envelope.powf(self.talk.envelope_exponent);

        let lerp = rate_for_dt(self.jaw.speed, dt);

        let lower_jaw = self.update_lower(open, lerp, scene);
        let upper_jaw = self.update_upper(open, lerp, scene);
        let tongue_y = self.tongue.update(self.elapsed, self.envelope, lerp, scene);

        self.last = MouthFrame {
            envelope: self.envelope,
            open,
            hz,
            speaking,
            lower_jaw,
            upper_jaw,
            tongue_y,
        };
        self.last
    }

    fn update_lower(&mut self, open: f32, lerp: f32, scene: &mut dyn SceneGraph) -> Option<f32> {
        let node = scene.node_mut(&self.lower_node)?;
        let pose = self.lower_pose.get_or_insert_with(|| {
            debug!(node = %self.lower_node, rotation = node.rotation.x, "captured lower jaw rest pose");
            ArticulationPose::capture(node.rotation.x, node.position)
        });

        let target = open * self.jaw.bottom_max;
        pose.rotation += (target - pose.rotation) * lerp;
        node.rotation.x = pose.rotation;
        Some(pose.rotation)
    }

    fn update_upper(
        &mut self,
        open: f32,
        lerp: f32,
        scene: &mut dyn SceneGraph,
    ) -> Option<(f32, Vec3)> {
        let node = scene.node_mut(&self.upper_node)?;
        let upper = &self.upper;
        let pose = self.upper_pose.get_or_insert_with(|| {
            debug!(node = %self.upper_node, rotation = node.rotation.x, "captured upper jaw rest pose");
            // Idle bias applies once, at capture, so the upper jaw shows at rest
            let mut pose = ArticulationPose::capture(node.rotation.x, node.position);
            pose.rotation = pose.rest_rotation + upper.bias_rot_x;
            pose.position.y = pose.rest_position.y + upper.bias_pos_y;
            pose.position.z = pose.rest_position.z + upper.bias_pos_z;
            pose
        });

        let target_rot = pose.rest_rotation + upper.bias_rot_x + open * self.jaw.top_max;
        let target_y = pose.rest_position.y + upper.bias_pos_y + open * upper.move_y;
        let target_z = pose.rest_position.z + upper.bias_pos_z + open * upper.move_z;

        pose.rotation += (target_rot - pose.rotation) * lerp;
        pose.position.y += (target_y - pose.position.y) * lerp;
        pose.position.z += (target_z - pose.position.z) * lerp;

        node.rotation.x = pose.rotation;
        node.position = pose.position;
        Some((pose.rotation, pose.position))
    }

    /// Forget captured rest poses; the next update captures them from the
    /// (new) scene
    pub fn forget_rig(&mut self) {
        self.lower_pose = None;
        self.upper_pose = None;
        self.tongue.forget_rest();
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn last_frame(&self) -> MouthFrame {
        self.last
    }

    pub fn lower_pose(&self) -> Option<ArticulationPose> {
        self.lower_pose
    }

    pub fn upper_pose(&self) -> Option<ArticulationPose> {
        self.upper_pose
    }

    pub fn talk_config(&self) -> &TalkConfig {
        &self.talk
    }

    pub fn jaw_config(&self) -> &JawConfig {
        &self.jaw
    }
}
