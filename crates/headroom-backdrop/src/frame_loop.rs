//! Frame loop - a cancellable, throttled draw schedule
//!
//! The loop is either stopped or running from a time origin. While running,
//! each host callback asks `poll(now)` whether to draw. Draws are spaced by
//! at least `ceil(1e6 / fps)` microseconds, so no one-second window ever
//! holds more than `fps` draws regardless of the host's refresh rate.

use std::time::Duration;

use headroom_core::FrameTime;

/// Supported draw rate range
pub const MIN_TARGET_FPS: u32 = 1;
pub const MAX_TARGET_FPS: u32 = 240;

/// Result of polling the loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopTick {
    /// Draw this frame
    Draw {
        /// Seconds since the loop's origin
        elapsed: f32,
        /// Seconds since the previous draw, 0 on the first
        since_last: f32,
    },
    /// Too soon after the previous draw
    Skip,
    /// Loop is not running
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Stopped,
    Running {
        origin: FrameTime,
        last_draw: Option<FrameTime>,
    },
}

#[derive(Debug, Clone)]
pub struct FrameLoop {
    min_spacing_us: i64,
    state: LoopState,
}

impl FrameLoop {
    /// Create a stopped loop; `target_fps` is clamped to the supported range
    pub fn new(target_fps: u32) -> Self {
        Self {
            min_spacing_us: min_spacing_micros(target_fps),
            state: LoopState::Stopped,
        }
    }

    /// (Re)start with a fresh time origin; the next poll always draws
    pub fn start(&mut self, now: FrameTime) {
        self.state = LoopState::Running {
            origin: now,
            last_draw: None,
        };
    }

    /// Stop the loop. Idempotent.
    pub fn cancel(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    pub fn origin(&self) -> Option<FrameTime> {
        match self.state {
            LoopState::Running { origin, .. } => Some(origin),
            LoopState::Stopped => None,
        }
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_micros(self.min_spacing_us as u64)
    }

    pub fn poll(&mut self, now: FrameTime) -> LoopTick {
        let LoopState::Running { origin, last_draw } = &mut self.state else {
            return LoopTick::Stopped;
        };

        let since_last = match *last_draw {
            Some(last) => {
                let gap = now.as_micros() - last.as_micros();
                if gap < self.min_spacing_us {
                    return LoopTick::Skip;
                }
                gap as f32 / 1_000_000.0
            }
            None => 0.0,
        };

        *last_draw = Some(now);
        LoopTick::Draw {
            elapsed: now.since(*origin).as_secs_f32(),
            since_last,
        }
    }
}

/// Minimum draw spacing for a frame rate, in whole microseconds (rounded up)
pub fn min_spacing_micros(target_fps: u32) -> i64 {
    let fps = target_fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS) as i64;
    (1_000_000 + fps - 1) / fps
}
