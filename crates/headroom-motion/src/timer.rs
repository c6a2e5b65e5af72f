//! Repeating timer - owned, cancellable, deadline based
//!
//! The timer never calls back on its own. Whoever owns it polls with the
//! current time and gets back how many periods elapsed. Dropping or
//! cancelling the timer is therefore enough to stop it: there is no
//! detached callback left behind to mutate state.

use std::time::Duration;

use headroom_core::FrameTime;

/// Most periods replayed by a single poll; beyond this the timer realigns
pub const MAX_CATCH_UP: u32 = 16;

#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    next_deadline: Option<FrameTime>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_micros(1)),
            next_deadline: None,
        }
    }

    /// Arm the timer; the first tick is one period after `now`
    pub fn start(&mut self, now: FrameTime) {
        self.next_deadline = Some(now + self.period);
    }

    /// Disarm the timer. Idempotent.
    pub fn cancel(&mut self) {
        self.next_deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }

    pub fn deadline(&self) -> Option<FrameTime> {
        self.next_deadline
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Count the periods that elapsed up to `now` and advance the deadline.
    /// Returns 0 when disarmed.
    pub fn poll(&mut self, now: FrameTime) -> u32 {
        let Some(mut deadline) = self.next_deadline else {
            return 0;
        };

        let mut fired = 0;
        while deadline <= now {
            fired += 1;
            deadline = deadline + self.period;
            if fired == MAX_CATCH_UP {
                // Host stalled; resume the cadence from now
                if deadline <= now {
                    deadline = now + self.period;
                }
                break;
            }
        }
        self.next_deadline = Some(deadline);
        fired
    }
}
