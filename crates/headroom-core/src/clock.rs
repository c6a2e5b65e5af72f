//! Session clock - step-driven frame time source
//!
//! Hosts own their timebase and report elapsed time per frame; the clock
//! turns that into a monotonic `FrameTime` and a capped `dt`.

use std::time::Duration;

use crate::FrameTime;

/// Default cap on a single frame step
pub const DEFAULT_MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// INVARIANT: frame time never decreases
#[derive(Debug, Clone)]
pub struct SessionClock {
    value: FrameTime,
    /// Largest step a single advance may take
    max_step: Duration,
}

/// One clock tick: the new frame time and the step since the previous tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub now: FrameTime,
    pub dt: f32,
}

impl FrameTick {
    /// The tick a session starts on
    pub const START: FrameTick = FrameTick {
        now: FrameTime::ZERO,
        dt: 0.0,
    };
}

impl SessionClock {
    pub fn new() -> Self {
        Self::with_max_step(DEFAULT_MAX_FRAME_STEP)
    }

    pub fn with_max_step(max_step: Duration) -> Self {
        SessionClock {
            value: FrameTime::ZERO,
            max_step,
        }
    }

    /// Advance by the host-reported elapsed time.
    /// Steps longer than `max_step` (suspend, debugger) are cut to `max_step`.
    pub fn advance(&mut self, elapsed: Duration) -> FrameTick {
        let clamped = elapsed.min(self.max_step);
        self.value = self.value + clamped;
        FrameTick {
            now: self.value,
            dt: clamped.as_secs_f32(),
        }
    }

    pub fn now(&self) -> FrameTime {
        self.value
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_clock_clamps_step() {
        let mut clock = SessionClock::new();
        let tick = clock.advance(Duration::from_secs(5));

        assert_eq!(tick.now, FrameTime::from_millis(100));
        assert!((tick.dt - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_session_clock_explicit_advance() {
        let mut clock = SessionClock::with_max_step(Duration::from_secs(1));
        clock.advance(Duration::from_millis(16));
        let tick = clock.advance(Duration::from_millis(17));
        assert_eq!(clock.now(), FrameTime::from_millis(33));
        assert_eq!(tick.now, clock.now());
    }

    #[test]
    fn test_session_clock_zero_step_holds() {
        let mut clock = SessionClock::new();
        clock.advance(Duration::from_millis(10));
        let tick = clock.advance(Duration::ZERO);
        assert_eq!(tick.now, FrameTime::from_millis(10));
        assert_eq!(tick.dt, 0.0);
    }
}
