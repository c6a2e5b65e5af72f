//! Scripted voice-layer input

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use headroom_core::{FrameTime, VoiceMode};
use headroom_runtime::{AvatarEngine, VoiceSink};

/// One voice-layer or page event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalEvent {
    GlitchTarget(f32),
    Speech(f32),
    Mode(VoiceMode),
    Visible(bool),
    SlatsPhase(f32),
}

impl SignalEvent {
    pub fn apply(self, engine: &mut AvatarEngine, now: FrameTime) {
        match self {
            SignalEvent::GlitchTarget(value) => engine.report_glitch_intensity(value),
            SignalEvent::Speech(value) => engine.report_speech_intensity(value),
            SignalEvent::Mode(mode) => engine.on_voice_mode(mode),
            SignalEvent::Visible(visible) => engine.set_visible(visible, now),
            SignalEvent::SlatsPhase(phase) => engine.set_slats_phase(phase),
        }
    }
}

/// Time-ordered list of events
#[derive(Debug, Clone, Default)]
pub struct SignalScript {
    events: Vec<(FrameTime, SignalEvent)>,
    cursor: usize,
}

impl SignalScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event at `secs` seconds; events stay sorted by time
    pub fn at(mut self, secs: f64, event: SignalEvent) -> Self {
        let time = FrameTime::from_secs_f64(secs);
        let idx = self.events.partition_point(|(t, _)| *t <= time);
        self.events.insert(idx, (time, event));
        self
    }

    /// Events due at or before `now` that have not been handed out yet
    pub fn due(&mut self, now: FrameTime) -> &[(FrameTime, SignalEvent)] {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].0 <= now {
            self.cursor += 1;
        }
        &self.events[start..self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Syllable-like speech amplitude: bursts of noisy loudness separated by
/// short pauses
#[derive(Debug)]
pub struct SyntheticSpeech {
    rng: StdRng,
    level: f32,
    /// Seconds left in the current burst or pause
    remaining: f32,
    voiced: bool,
}

impl SyntheticSpeech {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            level: 0.0,
            remaining: 0.0,
            voiced: false,
        }
    }

    /// Amplitude for the next `dt` seconds [0.0 - 1.0]
    pub fn next(&mut self, dt: f32) -> f32 {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.voiced = !self.voiced;
            self.remaining = if self.voiced {
                self.rng.gen_range(0.12..0.45)
            } else {
                self.rng.gen_range(0.04..0.2)
            };
            self.level = if self.voiced {
                self.rng.gen_range(0.35..1.0)
            } else {
                0.0
            };
        }

        if !self.voiced {
            return 0.0;
        }
        let wobble: f32 = self.rng.gen_range(-0.15..0.15);
        (self.level + wobble).clamp(0.0, 1.0)
    }
}
