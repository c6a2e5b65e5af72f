//! Tokio frame driver
//!
//! Hosts without a display callback of their own can drive a shared engine
//! with two tasks: a display-rate frame loop and a faster wall-clock poll for
//! the glitch jump timer. Both are aborted when the handle is stopped or
//! dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use headroom_core::{FrameTime, HeadroomError, HeadroomResult, DEFAULT_MAX_FRAME_STEP};

use crate::{AvatarEngine, VoiceSink};

/// Engine shared between the driver tasks and the voice layer
pub type SharedEngine = Arc<Mutex<AvatarEngine>>;

/// Wrap an engine for sharing
pub fn share(engine: AvatarEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

impl VoiceSink for SharedEngine {
    fn report_glitch_intensity(&mut self, value: f32) {
        self.lock().set_glitch_target(value);
    }

    fn report_speech_intensity(&mut self, value: f32) {
        self.lock().set_speech_intensity(value);
    }
}

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Display-rate frame period
    pub frame_interval: Duration,
    /// Glitch timer poll period
    pub timer_poll_interval: Duration,
    /// Largest `dt` handed to a single frame
    pub max_frame_step: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(16_667),
            timer_poll_interval: Duration::from_millis(10),
            max_frame_step: DEFAULT_MAX_FRAME_STEP,
        }
    }
}

impl DriverConfig {
    /// Driver for a host refreshing at `fps`
    pub fn with_fps(fps: u32) -> Self {
        let fps = fps.max(1) as u64;
        Self {
            frame_interval: Duration::from_micros(1_000_000 / fps),
            ..Self::default()
        }
    }
}

/// Handle to a running driver
#[derive(Debug)]
pub struct DriverHandle {
    frame_task: Option<JoinHandle<()>>,
    timer_task: Option<JoinHandle<()>>,
    frames: Arc<AtomicU64>,
}

impl DriverHandle {
    /// Frames driven so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Both tasks still alive
    pub fn is_running(&self) -> bool {
        let alive = |task: &Option<JoinHandle<()>>| task.as_ref().is_some_and(|t| !t.is_finished());
        alive(&self.frame_task) && alive(&self.timer_task)
    }

    /// Abort both tasks. Idempotent.
    pub fn stop(&mut self) {
        let mut stopped = false;
        for task in [self.frame_task.take(), self.timer_task.take()].into_iter().flatten() {
            task.abort();
            stopped = true;
        }
        if stopped {
            debug!(frames = self.frames(), "driver stopped");
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start driving `engine` on the current tokio runtime.
///
/// The driver's start instant becomes frame time zero and the engine's
/// backdrop loop is (re)started from it. Fails with `DriverStopped` if the
/// engine has already been torn down.
pub fn spawn(engine: SharedEngine, config: DriverConfig) -> HeadroomResult<DriverHandle> {
    let origin = Instant::now();
    {
        let mut guard = engine.lock();
        if guard.is_torn_down() {
            return Err(HeadroomError::DriverStopped);
        }
        guard.start(FrameTime::ZERO);
    }

    let frames = Arc::new(AtomicU64::new(0));
    let frame_task = tokio::spawn(frame_loop(
        Arc::clone(&engine),
        config.clone(),
        origin,
        Arc::clone(&frames),
    ));
    let timer_task = tokio::spawn(timer_loop(engine, config.timer_poll_interval, origin));
    debug!(
        frame_interval = ?config.frame_interval,
        timer_poll_interval = ?config.timer_poll_interval,
        "driver started"
    );

    Ok(DriverHandle {
        frame_task: Some(frame_task),
        timer_task: Some(timer_task),
        frames,
    })
}

fn frame_time(origin: Instant, now: Instant) -> FrameTime {
    let micros = now.saturating_duration_since(origin).as_micros();
    FrameTime::from_micros(i64::try_from(micros).unwrap_or(i64::MAX))
}

async fn frame_loop(engine: SharedEngine, config: DriverConfig, origin: Instant, frames: Arc<AtomicU64>) {
    let mut ticker = time::interval(config.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = origin;

    loop {
        let tick = ticker.tick().await;
        let dt = tick
            .saturating_duration_since(last)
            .min(config.max_frame_step)
            .as_secs_f32();
        last = tick;

        let output = engine.lock().frame(frame_time(origin, tick), dt);
        if output.is_none() {
            debug!("engine torn down, frame loop exiting");
            break;
        }
        frames.fetch_add(1, Ordering::Relaxed);
    }
}

async fn timer_loop(engine: SharedEngine, period: Duration, origin: Instant) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let tick = ticker.tick().await;
        let mut guard = engine.lock();
        if guard.is_torn_down() {
            break;
        }
        let fired = guard.poll_timers(frame_time(origin, tick));
        if fired > 0 {
            trace!(fired, "glitch timer fired between frames");
        }
    }
}
