//! Host simulator for engine testing
//!
//! Drives an `AvatarEngine` the way a display callback would, at a fixed
//! refresh rate with optional frame-time jitter, and records one sample per
//! frame.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use headroom_backdrop::BackdropTick;
use headroom_core::{FrameTick, FrameTime, SessionClock, DEFAULT_MAX_FRAME_STEP};
use headroom_motion::GlitchPhase;
use headroom_runtime::{AvatarEngine, FrameOutput};

use crate::{DrawCounter, SignalScript, SyntheticSpeech};

/// What one simulated frame produced
#[derive(Debug, Clone, Copy)]
pub struct FrameSample {
    pub now: FrameTime,
    pub glitch_actual: f32,
    pub glitch_phase: GlitchPhase,
    pub rotation_offset: f32,
    pub scale_factor: f32,
    pub envelope: f32,
    pub open: f32,
    pub hz: f32,
    pub lower_jaw: Option<f32>,
    pub backdrop: BackdropTick,
}

impl From<&FrameOutput> for FrameSample {
    fn from(out: &FrameOutput) -> Self {
        Self {
            now: out.now,
            glitch_actual: out.glitch_actual,
            glitch_phase: out.glitch.phase,
            rotation_offset: out.glitch.rotation_offset,
            scale_factor: out.glitch.scale_factor,
            envelope: out.mouth.envelope,
            open: out.mouth.open,
            hz: out.mouth.hz,
            lower_jaw: out.mouth.lower_jaw,
            backdrop: out.backdrop,
        }
    }
}

/// Fixed-rate host
pub struct FrameSimulator {
    engine: AvatarEngine,
    period_us: i64,
    jitter_us: i64,
    rng: StdRng,
    clock: SessionClock,
    tick: FrameTick,
    /// One-off extra delay before the next frame
    stall: Duration,
    speech: Option<SyntheticSpeech>,
    samples: Vec<FrameSample>,
    draws: DrawCounter,
}

impl FrameSimulator {
    /// Host refreshing at `host_fps`; starts the engine at time zero
    pub fn new(mut engine: AvatarEngine, host_fps: u32) -> Self {
        engine.start(FrameTime::ZERO);
        let period_us = 1_000_000 / host_fps.max(1) as i64;
        let max_step = DEFAULT_MAX_FRAME_STEP.max(Duration::from_micros(period_us as u64));
        Self {
            engine,
            period_us,
            jitter_us: 0,
            rng: StdRng::seed_from_u64(0),
            clock: SessionClock::with_max_step(max_step),
            tick: FrameTick::START,
            stall: Duration::ZERO,
            speech: None,
            samples: Vec::new(),
            draws: DrawCounter::per_second(),
        }
    }

    /// Vary each frame period by up to ±`max_us` (never below 1 µs)
    pub fn with_jitter(mut self, max_us: i64, seed: u64) -> Self {
        self.jitter_us = max_us.max(0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Feed synthetic speech every frame instead of scripted speech
    pub fn with_synthetic_speech(mut self, seed: u64) -> Self {
        self.speech = Some(SyntheticSpeech::new(seed));
        self
    }

    /// Delay the next frame by `gap` on top of the frame period, as a
    /// suspended host would. The clock caps the resulting step.
    pub fn stall(&mut self, gap: Duration) {
        self.stall += gap;
    }

    /// Run one frame at the current time, then advance the clock.
    /// Returns `None` once the engine is torn down.
    pub fn step(&mut self, script: &mut SignalScript) -> Option<FrameSample> {
        let FrameTick { now, dt } = self.tick;

        for &(_, event) in script.due(now) {
            event.apply(&mut self.engine, now);
        }
        if let Some(speech) = self.speech.as_mut() {
            let value = speech.next(dt);
            self.engine.set_speech_intensity(value);
        }

        let output = self.engine.frame(now, dt)?;
        let sample = FrameSample::from(&output);
        if sample.backdrop == BackdropTick::Drawn {
            self.draws.record(now);
        }
        self.samples.push(sample);

        let jitter = if self.jitter_us > 0 {
            self.rng.gen_range(-self.jitter_us..=self.jitter_us)
        } else {
            0
        };
        let period = Duration::from_micros((self.period_us + jitter).max(1) as u64);
        self.tick = self.clock.advance(period + std::mem::take(&mut self.stall));
        Some(sample)
    }

    /// Run frames until the clock passes `secs` seconds
    pub fn run_until(&mut self, secs: f64, script: &mut SignalScript) -> usize {
        let end = FrameTime::from_secs_f64(secs);
        let mut frames = 0;
        while self.tick.now <= end {
            if self.step(script).is_none() {
                break;
            }
            frames += 1;
        }
        frames
    }

    /// Last sample at or before `secs` seconds
    pub fn sample_at(&self, secs: f64) -> Option<&FrameSample> {
        let time = FrameTime::from_secs_f64(secs);
        self.samples.iter().rev().find(|s| s.now <= time)
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    pub fn draws(&self) -> &DrawCounter {
        &self.draws
    }

    pub fn now(&self) -> FrameTime {
        self.tick.now
    }

    pub fn engine(&self) -> &AvatarEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AvatarEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> AvatarEngine {
        self.engine
    }
}
