//! Avatar engine - one avatar session
//!
//! Per frame, in order:
//! 1. Smooth the glitch target
//! 2. Glitch perturbation (phase transitions, due jumps) from the smoothed value
//! 3. Mouth articulation from the raw speech intensity
//! 4. Backdrop tick from the smoothed value
//! 5. Post-fx parameters from the smoothed value
//!
//! The mouth only reads the raw speech scalar, so its position in the order
//! is free; the smoother always runs before its two consumers.

use tracing::debug;

use headroom_backdrop::{BackdropStats, ProceduralBackdropRenderer};
use headroom_core::{AvatarProfile, FrameTime, HeadroomResult, Intensity, VoiceMode};
use headroom_motion::{
    GlitchPerturber, GlitchStats, IntensitySmoother, MouthArticulator, SceneGraph,
};

use crate::{FrameOutput, PostFxParams, VoiceSink};

/// Scene handle owned by the engine
pub type BoxedScene = Box<dyn SceneGraph + Send>;

/// Engine statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub frames: u64,
    pub scene_swaps: u64,
    pub glitch: GlitchStats,
    pub backdrop: BackdropStats,
}

/// One avatar: smoother, mouth, glitch and backdrop over a scene
pub struct AvatarEngine {
    profile: AvatarProfile,
    scene: BoxedScene,

    smoother: IntensitySmoother,
    mouth: MouthArticulator,
    glitch: GlitchPerturber,
    backdrop: ProceduralBackdropRenderer,

    glitch_target: Intensity,
    speech: Intensity,
    last_output: Option<FrameOutput>,

    frames: u64,
    scene_swaps: u64,
    torn_down: bool,
}

impl AvatarEngine {
    /// Validate the profile and build an engine with entropy-seeded randomness
    pub fn new(profile: AvatarProfile, scene: BoxedScene) -> HeadroomResult<Self> {
        profile.validate()?;
        let mouth = MouthArticulator::new(
            profile.talk.clone(),
            profile.jaw.clone(),
            profile.upper_jaw.clone(),
            profile.tongue.clone(),
            &profile.nodes,
        );
        let glitch = GlitchPerturber::new(profile.glitch.clone(), profile.nodes.root.clone());
        let backdrop = ProceduralBackdropRenderer::new(profile.backdrop.clone());
        Ok(Self::assemble(profile, scene, mouth, glitch, backdrop))
    }

    /// Same as `new`, with every random source derived from `seed`
    pub fn with_seed(profile: AvatarProfile, scene: BoxedScene, seed: u64) -> HeadroomResult<Self> {
        profile.validate()?;
        let mouth = MouthArticulator::with_seed(
            profile.talk.clone(),
            profile.jaw.clone(),
            profile.upper_jaw.clone(),
            profile.tongue.clone(),
            &profile.nodes,
            seed,
        );
        let glitch = GlitchPerturber::with_seed(
            profile.glitch.clone(),
            profile.nodes.root.clone(),
            seed.wrapping_add(1),
        );
        let backdrop =
            ProceduralBackdropRenderer::with_seed(profile.backdrop.clone(), seed.wrapping_add(2));
        Ok(Self::assemble(profile, scene, mouth, glitch, backdrop))
    }

    fn assemble(
        profile: AvatarProfile,
        scene: BoxedScene,
        mouth: MouthArticulator,
        glitch: GlitchPerturber,
        backdrop: ProceduralBackdropRenderer,
    ) -> Self {
        debug!(profile = %profile.name, "avatar engine created");
        Self {
            smoother: IntensitySmoother::new(profile.smoothing.clone()),
            profile,
            scene,
            mouth,
            glitch,
            backdrop,
            glitch_target: Intensity::ZERO,
            speech: Intensity::ZERO,
            last_output: None,
            frames: 0,
            scene_swaps: 0,
            torn_down: false,
        }
    }

    /// Set the glitch step input (voice layer)
    pub fn set_glitch_target(&mut self, value: impl Into<Intensity>) {
        self.glitch_target = value.into();
    }

    /// Set the speech amplitude (voice layer)
    pub fn set_speech_intensity(&mut self, value: impl Into<Intensity>) {
        self.speech = value.into();
    }

    /// Agent mode transition (voice layer)
    pub fn on_voice_mode(&mut self, mode: VoiceMode) {
        debug!(?mode, "voice mode");
        self.report_voice_mode(mode);
    }

    /// Size the backdrop surface to the host element
    pub fn resize_backdrop(&mut self, css_width: f32, css_height: f32, device_dpr: f32) -> HeadroomResult<()> {
        self.backdrop.resize(css_width, css_height, device_dpr)
    }

    /// Start the backdrop frame loop
    pub fn start(&mut self, now: FrameTime) {
        if self.torn_down {
            return;
        }
        self.backdrop.start(now);
    }

    /// Page visibility change
    pub fn set_visible(&mut self, visible: bool, now: FrameTime) {
        self.backdrop.set_visible(visible, now);
    }

    pub fn set_slats_phase(&mut self, phase: f32) {
        self.backdrop.set_slats_phase(phase);
    }

    /// Run one frame. Returns `None` once the engine is torn down.
    pub fn frame(&mut self, now: FrameTime, dt: f32) -> Option<FrameOutput> {
        if self.torn_down {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let actual = self.smoother.update(self.glitch_target, dt);

        self.glitch.update(actual, now, dt, self.scene.as_mut());
        let jumps_fired = self.glitch.poll_timer(now, self.scene.as_mut());

        let mouth = self.mouth.update(self.speech.get(), dt, self.scene.as_mut());
        let backdrop = self.backdrop.tick(now, actual);
        let post_fx = PostFxParams::derive(actual, &self.profile.post_fx);

        self.frames += 1;
        let output = FrameOutput {
            now,
            dt,
            glitch_target: self.glitch_target.get(),
            glitch_actual: actual,
            speech: self.speech.get(),
            mouth,
            glitch: self.glitch.state(),
            jumps_fired,
            backdrop,
            post_fx,
        };
        self.last_output = Some(output);
        Some(output)
    }

    /// Fire due glitch jumps between frames (wall-clock timer hosts)
    pub fn poll_timers(&mut self, now: FrameTime) -> u32 {
        if self.torn_down {
            return 0;
        }
        self.glitch.poll_timer(now, self.scene.as_mut())
    }

    /// Replace the scene. Cancels the jump timer and forgets every captured
    /// rest pose; the new scene's nodes are picked up on the next frame.
    pub fn swap_scene(&mut self, scene: BoxedScene) -> BoxedScene {
        self.glitch.reset();
        self.mouth.forget_rig();
        self.scene_swaps += 1;
        debug!(swaps = self.scene_swaps, "scene swapped");
        std::mem::replace(&mut self.scene, scene)
    }

    /// Cancel every timer and frame loop. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.glitch.cancel();
        self.backdrop.stop();
        self.smoother.reset();
        self.glitch_target = Intensity::ZERO;
        self.speech = Intensity::ZERO;
        self.torn_down = true;
        debug!(frames = self.frames, "avatar engine torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Jump timer still armed (leak check after teardown)
    pub fn has_pending_timers(&self) -> bool {
        self.glitch.is_timer_armed()
    }

    pub fn last_output(&self) -> Option<&FrameOutput> {
        self.last_output.as_ref()
    }

    pub fn profile(&self) -> &AvatarProfile {
        &self.profile
    }

    pub fn scene(&self) -> &dyn SceneGraph {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> &mut dyn SceneGraph {
        self.scene.as_mut()
    }

    pub fn smoother(&self) -> &IntensitySmoother {
        &self.smoother
    }

    pub fn mouth(&self) -> &MouthArticulator {
        &self.mouth
    }

    pub fn glitch(&self) -> &GlitchPerturber {
        &self.glitch
    }

    pub fn backdrop(&self) -> &ProceduralBackdropRenderer {
        &self.backdrop
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frames: self.frames,
            scene_swaps: self.scene_swaps,
            glitch: self.glitch.stats(),
            backdrop: self.backdrop.stats(),
        }
    }
}

impl VoiceSink for AvatarEngine {
    fn report_glitch_intensity(&mut self, value: f32) {
        self.set_glitch_target(value);
    }

    fn report_speech_intensity(&mut self, value: f32) {
        self.set_speech_intensity(value);
    }
}

impl std::fmt::Debug for AvatarEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarEngine")
            .field("profile", &self.profile.name)
            .field("glitch_target", &self.glitch_target)
            .field("speech", &self.speech)
            .field("frames", &self.frames)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headroom_backdrop::BackdropTick;
    use headroom_core::{GlitchConfig, HeadroomError, NodeNames};
    use headroom_motion::{GlitchPhase, NodeMap, NodeTransform, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn rig() -> BoxedScene {
        let names = NodeNames::default();
        Box::new(
            NodeMap::new()
                .with_node(names.root, NodeTransform::with_scale(5.0))
                .with_node(names.lower_jaw, NodeTransform::identity())
                .with_node(names.upper_jaw, NodeTransform::identity()),
        )
    }

    fn engine() -> AvatarEngine {
        let mut engine = AvatarEngine::with_seed(AvatarProfile::default(), rig(), 99).unwrap();
        engine.resize_backdrop(32.0, 24.0, 1.0).unwrap();
        engine.start(FrameTime::ZERO);
        engine
    }

    fn at(frame: u32) -> FrameTime {
        FrameTime::from_micros(frame as i64 * 16_667)
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut profile = AvatarProfile::default();
        profile.smoothing.rate = 0.0;
        let err = AvatarEngine::new(profile, rig()).unwrap_err();
        assert!(matches!(err, HeadroomError::InvalidConfig { .. }));
    }

    #[test]
    fn test_smoothing_feeds_consumers() {
        let mut engine = engine();
        engine.set_glitch_target(1.0);

        let out = engine.frame(at(0), DT).unwrap();
        assert!((out.glitch_actual - 0.18).abs() < 1e-4);
        assert_eq!(out.glitch_target, 1.0);
        assert_eq!(out.glitch.phase, GlitchPhase::Active);
        assert!(out.post_fx.glitch_active);
        assert_eq!(out.backdrop, BackdropTick::Drawn);
    }

    #[test]
    fn test_voice_mode_drives_glitch() {
        let mut engine = engine();
        engine.on_voice_mode(VoiceMode::Speaking);
        for frame in 0..60 {
            engine.frame(at(frame), DT);
        }
        assert_eq!(engine.smoother().actual(), 1.0);

        engine.report_speech_intensity(0.7);
        engine.on_voice_mode(VoiceMode::Listening);
        let out = engine.frame(at(60), DT).unwrap();
        assert_eq!(out.glitch_target, 0.0);
        assert_eq!(out.speech, 0.0);
        assert!(out.glitch_actual > 0.5);
    }

    #[test]
    fn test_mouth_moves_jaw_in_scene() {
        let mut engine = engine();
        engine.set_speech_intensity(0.9);
        for frame in 0..10 {
            engine.frame(at(frame), DT);
        }
        let jaw = engine
            .scene()
            .node(&NodeNames::default().lower_jaw)
            .unwrap()
            .rotation
            .x;
        assert!(jaw > 0.0);
    }

    #[test]
    fn test_jumps_fire_from_frames_and_polls() {
        let mut engine = engine();
        engine.set_glitch_target(1.0);
        engine.frame(at(0), DT);

        assert_eq!(engine.poll_timers(FrameTime::from_millis(600)), 1);
        assert_eq!(engine.poll_timers(FrameTime::from_millis(700)), 0);

        let out = engine.frame(FrameTime::from_millis(1200), DT).unwrap();
        assert_eq!(out.jumps_fired, 1);
        assert_eq!(engine.stats().glitch.rotation_jumps, 2);
    }

    #[test]
    fn test_huge_jump_profile_runs() {
        let profile = AvatarProfile::from_json_str(r#"{"glitch":{"max_jump_degrees":3.0e38}}"#).unwrap();
        let mut engine = AvatarEngine::with_seed(profile, rig(), 4).unwrap();
        engine.resize_backdrop(32.0, 24.0, 1.0).unwrap();
        engine.start(FrameTime::ZERO);
        engine.set_glitch_target(1.0);

        for frame in 0..120 {
            let out = engine.frame(at(frame), DT).unwrap();
            assert!(out.glitch.rotation_offset.abs() <= GlitchConfig::ROTATION_LIMIT);
        }
        assert!(engine.stats().glitch.rotation_jumps > 0);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut engine = engine();
        engine.set_glitch_target(1.0);
        engine.frame(at(0), DT);
        assert!(engine.has_pending_timers());

        engine.teardown();
        engine.teardown();

        assert!(engine.is_torn_down());
        assert!(!engine.has_pending_timers());
        assert!(!engine.backdrop().is_running());
        assert!(engine.frame(at(1), DT).is_none());
        assert_eq!(engine.poll_timers(FrameTime::from_secs_f64(60.0)), 0);

        // Reports after teardown cannot revive anything
        engine.set_glitch_target(1.0);
        engine.start(FrameTime::from_secs_f64(61.0));
        assert!(engine.frame(at(2), DT).is_none());
        assert!(!engine.has_pending_timers());
        assert!(!engine.backdrop().is_running());
    }

    #[test]
    fn test_swap_scene_rebinds() {
        let mut engine = engine();
        engine.set_glitch_target(1.0);
        engine.set_speech_intensity(1.0);
        engine.frame(at(0), DT);
        engine.poll_timers(FrameTime::from_millis(600));
        assert!(engine.has_pending_timers());

        let names = NodeNames::default();
        let fresh = NodeMap::new()
            .with_node(names.root.clone(), NodeTransform::with_scale(5.0))
            .with_node(
                names.upper_jaw.clone(),
                NodeTransform::with_position(Vec3::new(0.0, 1.0, 0.0)),
            );
        let old = engine.swap_scene(Box::new(fresh));
        assert!(old.node(&names.lower_jaw).is_some());

        assert!(!engine.has_pending_timers());
        assert!(engine.glitch().is_at_rest());
        assert!(engine.mouth().upper_pose().is_none());

        let out = engine.frame(FrameTime::from_millis(620), DT).unwrap();
        assert!(out.mouth.lower_jaw.is_none());
        assert!((engine.mouth().upper_pose().unwrap().rest_position.y - 1.0).abs() < 1e-6);
        // Still speaking-glitch: a fresh activation arms a new timer
        assert!(engine.has_pending_timers());
        assert_eq!(engine.stats().scene_swaps, 1);
    }

    #[test]
    fn test_instances_are_isolated() {
        let mut a = engine();
        let mut b = engine();

        a.set_glitch_target(1.0);
        a.set_speech_intensity(1.0);
        for frame in 0..30 {
            a.frame(at(frame), DT);
            b.frame(at(frame), DT);
        }
        a.teardown();

        assert_eq!(b.smoother().actual(), 0.0);
        assert_eq!(b.mouth().envelope(), 0.0);
        assert_eq!(b.stats().glitch.activations, 0);
        assert!(!b.is_torn_down());
        assert!(b.frame(at(30), DT).is_some());
    }
}
