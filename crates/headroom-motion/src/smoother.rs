//! Intensity smoother - step input to continuous ramp
//!
//! The voice layer flips the glitch target between 0 and 1. Everything
//! downstream reads the smoothed value instead, which approaches the target
//! exponentially and snaps onto it once close enough.

use headroom_core::{rate_for_dt, Intensity, SmoothingConfig};

/// Exponential approach toward a target, normalized to elapsed time
#[derive(Debug, Clone)]
pub struct IntensitySmoother {
    config: SmoothingConfig,
    target: Intensity,
    actual: f32,
}

impl IntensitySmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            target: Intensity::ZERO,
            actual: 0.0,
        }
    }

    /// Move toward `target` for `dt` seconds and return the new value.
    ///
    /// INVARIANT: the result lies between the previous value and the
    /// target (inclusive of the target), so it never overshoots.
    pub fn update(&mut self, target: impl Into<Intensity>, dt: f32) -> f32 {
        self.target = target.into();
        let target = self.target.get();

        let fraction = rate_for_dt(self.config.rate, dt);
        let next = self.actual + (target - self.actual) * fraction;

        self.actual = if (target - next).abs() < self.config.snap_epsilon {
            target
        } else {
            next
        };
        self.actual
    }

    /// Current smoothed value
    pub fn actual(&self) -> f32 {
        self.actual
    }

    /// Last target seen
    pub fn target(&self) -> Intensity {
        self.target
    }

    /// Has the value settled exactly onto the target?
    pub fn is_settled(&self) -> bool {
        self.actual == self.target.get()
    }

    /// Drop back to zero without ramping (session teardown)
    pub fn reset(&mut self) {
        self.target = Intensity::ZERO;
        self.actual = 0.0;
    }
}

impl Default for IntensitySmoother {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_first_step_is_rate_fraction() {
        let mut s = IntensitySmoother::default();
        let v = s.update(1.0, DT);
        assert!((v - 0.18).abs() < 1e-4);
    }

    #[test]
    fn test_reaches_target_exactly() {
        let mut s = IntensitySmoother::default();
        let mut frames = 0;
        while !s.is_settled() {
            s.update(1.0, DT);
            frames += 1;
            assert!(frames < 100, "did not settle");
        }
        assert_eq!(s.actual(), 1.0);
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut slow = IntensitySmoother::default();
        let mut fast = IntensitySmoother::default();

        for _ in 0..6 {
            slow.update(1.0, 1.0 / 30.0);
        }
        for _ in 0..24 {
            fast.update(1.0, 1.0 / 120.0);
        }
        assert!((slow.actual() - fast.actual()).abs() < 1e-3);
    }

    #[test]
    fn test_clamps_degenerate_targets() {
        let mut s = IntensitySmoother::default();
        for _ in 0..200 {
            s.update(7.0, DT);
        }
        assert_eq!(s.actual(), 1.0);
        for _ in 0..200 {
            s.update(-3.0, DT);
        }
        assert_eq!(s.actual(), 0.0);
    }

    #[test]
    fn test_zero_dt_holds_value() {
        let mut s = IntensitySmoother::default();
        s.update(1.0, DT);
        let before = s.actual();
        s.update(1.0, 0.0);
        assert_eq!(s.actual(), before);
    }

    proptest! {
        #[test]
        fn prop_never_overshoots(
            targets in prop::collection::vec(0.0f32..=1.0, 1..40),
            dts in prop::collection::vec(0.0f32..0.1, 40),
        ) {
            let mut s = IntensitySmoother::default();
            for (i, target) in targets.iter().enumerate() {
                let prev = s.actual();
                let next = s.update(*target, dts[i]);
                let (lo, hi) = if prev <= *target { (prev, *target) } else { (*target, prev) };
                prop_assert!(next >= lo - 1e-6 && next <= hi + 1e-6);
            }
        }

        #[test]
        fn prop_settles_within_bounded_updates(start in 0.0f32..=1.0, target in 0.0f32..=1.0) {
            let mut s = IntensitySmoother::default();
            for _ in 0..200 {
                s.update(start, DT);
            }
            let mut frames = 0;
            while s.actual() != target {
                s.update(target, DT);
                frames += 1;
                prop_assert!(frames <= 40);
            }
        }
    }
}
