//! Rolling-window draw counting

use std::collections::VecDeque;
use std::time::Duration;

use headroom_core::FrameTime;

/// Records draw times and tracks the busiest window seen
#[derive(Debug, Clone)]
pub struct DrawCounter {
    window_us: i64,
    recent: VecDeque<FrameTime>,
    total: u64,
    peak: usize,
}

impl DrawCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window_us: window.as_micros() as i64,
            recent: VecDeque::new(),
            total: 0,
            peak: 0,
        }
    }

    /// One-second window
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Record a draw; times must be non-decreasing
    pub fn record(&mut self, now: FrameTime) {
        // Half-open window (now - window, now]
        while let Some(&front) = self.recent.front() {
            if now.as_micros() - front.as_micros() >= self.window_us {
                self.recent.pop_front();
            } else {
                break;
            }
        }
        self.recent.push_back(now);
        self.total += 1;
        self.peak = self.peak.max(self.recent.len());
    }

    /// Most draws seen in any window
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
