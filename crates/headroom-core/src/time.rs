//! Time primitives for Headroom
//!
//! All animation state is keyed on `FrameTime`: microseconds since the
//! session origin. Integer microseconds keep frame throttling and timer
//! deadlines exact; float seconds are derived on demand for animation math.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Microseconds since the session origin
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(i64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        FrameTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        FrameTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        FrameTime((secs * 1_000_000.0) as i64)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Seconds, for animation math
    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        (self.0 as f64 / 1_000_000.0) as f32
    }

    /// Time elapsed since `earlier`; zero when `earlier` is later
    #[inline]
    pub fn since(self, earlier: FrameTime) -> Duration {
        self - earlier
    }
}

/// Moving forward saturates at the end of representable time
impl Add<Duration> for FrameTime {
    type Output = FrameTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        let micros = i64::try_from(rhs.as_micros()).unwrap_or(i64::MAX);
        FrameTime(self.0.saturating_add(micros))
    }
}

impl Sub<FrameTime> for FrameTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: FrameTime) -> Self::Output {
        u64::try_from(self.0.saturating_sub(rhs.0))
            .map(Duration::from_micros)
            .unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

/// Reference frame rate that per-frame rates in profiles are expressed against
pub const REFERENCE_FPS: f32 = 60.0;

/// Convert a per-reference-frame approach rate into a fraction for `dt` seconds.
///
/// `rate` is the fraction of the remaining distance covered in one 60 Hz
/// frame. The result covers the same distance per second at any frame rate.
#[inline]
pub fn rate_for_dt(rate: f32, dt: f32) -> f32 {
    let rate = rate.clamp(0.0, 1.0);
    let dt = dt.max(0.0);
    if rate >= 1.0 {
        return if dt > 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - (1.0 - rate).powf(dt * REFERENCE_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_arithmetic() {
        let t = FrameTime::from_millis(100);
        assert_eq!(t.as_micros(), 100_000);
        assert_eq!(t + Duration::from_millis(50), FrameTime::from_micros(150_000));
        assert_eq!(t - FrameTime::from_millis(40), Duration::from_millis(60));
        // Negative spans clamp to zero
        assert_eq!(FrameTime::ZERO - t, Duration::ZERO);
    }

    #[test]
    fn test_frame_time_saturates() {
        let end = FrameTime::from_micros(i64::MAX);
        assert_eq!(end + Duration::from_secs(1), end);
        assert_eq!(end.since(FrameTime::ZERO).as_micros(), i64::MAX as u128);
    }

    #[test]
    fn test_rate_for_dt_matches_reference_frame() {
        let f = rate_for_dt(0.18, 1.0 / 60.0);
        assert!((f - 0.18).abs() < 1e-5);
    }

    #[test]
    fn test_rate_for_dt_is_rate_independent() {
        // Two 120 Hz frames cover the same distance as one 60 Hz frame
        let half = rate_for_dt(0.18, 1.0 / 120.0);
        let remaining = (1.0 - half) * (1.0 - half);
        assert!((1.0 - remaining - 0.18).abs() < 1e-5);
    }

    #[test]
    fn test_rate_for_dt_zero_dt() {
        assert_eq!(rate_for_dt(0.5, 0.0), 0.0);
        assert_eq!(rate_for_dt(0.5, -1.0), 0.0);
    }
}
