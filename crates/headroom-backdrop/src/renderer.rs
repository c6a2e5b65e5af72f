//! Procedural backdrop renderer
//!
//! Owns the raster surface, the throttled frame loop, the cached slat tile
//! and the slat tilt animation. The host calls `tick(now, intensity)` from
//! its display callback; most calls are skipped by the throttle.

use std::f32::consts::FRAC_PI_8;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use headroom_core::{BackdropConfig, FrameTime, GradientAxis, HeadroomResult, Intensity};

use crate::{
    BlendMode, FrameLoop, LoopTick, RasterSurface, Rgb, SlatTile, MAX_TARGET_FPS, MIN_TARGET_FPS,
};

/// Supported device-pixel-ratio cap range
pub const MIN_DPR_CAP: f32 = 0.5;
pub const MAX_DPR_CAP: f32 = 4.0;

/// Initial slat tilt (radians)
pub const INITIAL_SLAT_ANGLE: f32 = -FRAC_PI_8;

/// Outcome of one host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropTick {
    Drawn,
    /// Throttled; nothing drawn
    Skipped,
    /// Loop cancelled (hidden page or stopped renderer)
    Stopped,
}

/// Backdrop statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackdropStats {
    pub frames_drawn: u64,
    pub frames_skipped: u64,
    pub tile_rebuilds: u64,
    pub resizes: u64,
}

/// Per-frame drawing inputs
#[derive(Debug, Clone, Copy)]
struct FrameParams {
    t: f32,
    intensity: f32,
    hue_base: f32,
    dpr: f32,
}

pub struct ProceduralBackdropRenderer {
    config: BackdropConfig,
    surface: RasterSurface,
    dpr: f32,
    frame_loop: FrameLoop,
    /// Host asked the loop to run
    enabled: bool,
    visible: bool,

    tile: Option<SlatTile>,
    tile_dirty: bool,
    tile_built_at: Option<FrameTime>,

    slats_phase: f32,
    angle: f32,
    angle_target: f32,
    /// Loop time of the last tilt retarget (seconds)
    last_retarget: f32,
    /// Wait before the next tilt retarget (seconds)
    retarget_after: f32,

    stats: BackdropStats,
    rng: StdRng,
}

impl ProceduralBackdropRenderer {
    pub fn new(config: BackdropConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic grain and tilt for tests and replays
    pub fn with_seed(config: BackdropConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BackdropConfig, mut rng: StdRng) -> Self {
        let config = clamp_config(config);
        let retarget_after = retarget_interval(&config, &mut rng);
        Self {
            frame_loop: FrameLoop::new(config.target_fps),
            config,
            surface: RasterSurface::default(),
            dpr: 1.0,
            enabled: false,
            visible: true,
            tile: None,
            tile_dirty: true,
            tile_built_at: None,
            slats_phase: 1.0,
            angle: INITIAL_SLAT_ANGLE,
            angle_target: INITIAL_SLAT_ANGLE,
            last_retarget: 0.0,
            retarget_after,
            stats: BackdropStats::default(),
            rng,
        }
    }

    /// Resize the backing surface to the displayed size times the capped
    /// pixel ratio. Invalidates the slat tile.
    pub fn resize(&mut self, css_width: f32, css_height: f32, device_dpr: f32) -> HeadroomResult<()> {
        let device_dpr = if device_dpr.is_finite() && device_dpr > 0.0 {
            device_dpr
        } else {
            1.0
        };
        let dpr = device_dpr.min(self.config.dpr_cap);
        let width = (css_width.max(0.0) * dpr).floor() as u32;
        let height = (css_height.max(0.0) * dpr).floor() as u32;

        self.surface.resize(width, height)?;
        self.dpr = dpr;
        self.tile_dirty = true;
        self.stats.resizes += 1;
        debug!(width, height, dpr, "backdrop resized");
        Ok(())
    }

    /// Start the frame loop with a fresh time origin
    pub fn start(&mut self, now: FrameTime) {
        self.enabled = true;
        if self.visible {
            self.restart_loop(now);
        }
    }

    /// Cancel the frame loop. Idempotent.
    pub fn stop(&mut self) {
        if self.enabled {
            debug!("backdrop loop stopped");
        }
        self.enabled = false;
        self.frame_loop.cancel();
    }

    /// Page visibility change. Hiding cancels the loop outright; showing
    /// restarts it from a fresh origin so nothing jumps across the gap.
    pub fn set_visible(&mut self, visible: bool, now: FrameTime) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        debug!(visible, "backdrop visibility changed");

        if !visible {
            self.frame_loop.cancel();
        } else if self.enabled {
            self.restart_loop(now);
        }
    }

    fn restart_loop(&mut self, now: FrameTime) {
        self.frame_loop.start(now);
        self.last_retarget = 0.0;
    }

    /// Fade the slat layer in or out [0.0 - 1.0]
    pub fn set_slats_phase(&mut self, phase: f32) {
        self.slats_phase = Intensity::new(phase).get();
    }

    /// Host display callback; draws at most at the target frame rate
    pub fn tick(&mut self, now: FrameTime, intensity: f32) -> BackdropTick {
        let (t, since_last) = match self.frame_loop.poll(now) {
            LoopTick::Stopped => return BackdropTick::Stopped,
            LoopTick::Skip => {
                self.stats.frames_skipped += 1;
                trace!(?now, "backdrop frame skipped");
                return BackdropTick::Skipped;
            }
            LoopTick::Draw { elapsed, since_last } => (elapsed, since_last),
        };

        let intensity = Intensity::new(intensity).get();
        let hue_base = (t * 8.0 + intensity * 30.0).rem_euclid(360.0);
        let params = FrameParams {
            t,
            intensity,
            hue_base,
            dpr: self.dpr,
        };

        self.refresh_tile(now, hue_base);
        self.animate_tilt(t, since_last);

        if !self.surface.is_empty() {
            self.draw_gradient(&params);
            self.draw_bloom(&params);
            self.draw_slats(&params);
            self.draw_band(&params);
            self.draw_scanlines(&params);
            self.draw_grain(&params);
            self.draw_vignette();
        }

        self.stats.frames_drawn += 1;
        BackdropTick::Drawn
    }

    fn refresh_tile(&mut self, now: FrameTime, hue_base: f32) {
        let stale = match self.tile_built_at {
            Some(built) => now.since(built) >= self.config.tile_refresh(),
            None => true,
        };
        if self.tile.is_none() || self.tile_dirty || stale {
            self.tile = Some(SlatTile::build(hue_base, self.dpr));
            self.tile_dirty = false;
            self.tile_built_at = Some(now);
            self.stats.tile_rebuilds += 1;
            trace!(hue_base, "slat tile rebuilt");
        }
    }

    fn animate_tilt(&mut self, t: f32, since_last: f32) {
        if t - self.last_retarget > self.retarget_after {
            let max = magnitude(self.config.slat_max_angle_deg);
            let degrees = self.rng.gen_range(-1.0f32..=1.0) * max;
            self.angle_target = degrees.to_radians();
            self.last_retarget = t;
            self.retarget_after = retarget_interval(&self.config, &mut self.rng);
            trace!(degrees, "slat tilt retarget");
        }

        // Ease is expressed per frame at the target rate
        let fps = self.config.target_fps as f32;
        let frames = if since_last > 0.0 { since_last * fps } else { 1.0 };
        let fraction = 1.0 - (1.0 - self.config.slat_ease).powf(frames);
        self.angle += (self.angle_target - self.angle) * fraction;
    }

    fn draw_gradient(&mut self, p: &FrameParams) {
        let top = Rgb::from_hsl(p.hue_base + 300.0, 0.70, 0.04);
        let bottom = Rgb::from_hsl(p.hue_base + 330.0, 0.80, (8.0 + 6.0 * p.intensity) / 100.0);

        let w = self.surface.width();
        let h = self.surface.height();
        let (wf, hf) = (w as f32, h as f32);
        let axis = self.config.gradient_axis;
        let diag_len2 = (wf * wf + hf * hf).max(1.0);

        for y in 0..h {
            let Some(row) = self.surface.row_mut(y) else {
                continue;
            };
            let py = y as f32 + 0.5;
            match axis {
                GradientAxis::Vertical => row.fill(top.lerp(bottom, py / hf)),
                GradientAxis::Diagonal => {
                    for (x, px) in row.iter_mut().enumerate() {
                        let px_x = x as f32 + 0.5;
                        let s = ((px_x * wf + py * hf) / diag_len2).clamp(0.0, 1.0);
                        *px = top.lerp(bottom, s);
                    }
                }
            }
        }
    }

    fn draw_bloom(&mut self, p: &FrameParams) {
        if self.config.bloom_alpha <= 0.0 {
            return;
        }
        let alpha = self.config.bloom_alpha + 0.03 * p.intensity;
        let (w, h) = (self.surface.width() as f32, self.surface.height() as f32);
        let outer = w.max(h) * 0.55;
        self.radial(outer * 0.2, outer, Rgb::WHITE, BlendMode::Lighter, |s| {
            alpha * (1.0 - s)
        });
    }

    fn draw_slats(&mut self, p: &FrameParams) {
        let Some(tile) = self.tile.as_ref() else {
            return;
        };
        let alpha = (self.config.slat_alpha + p.intensity * self.config.slat_alpha_gain)
            * self.slats_phase;
        if alpha <= 0.0 {
            return;
        }

        let speed = self.config.slat_speed + self.config.slat_speed_gain * p.intensity;
        let period = tile.period();
        let offset = (p.t * speed).rem_euclid(period) - period * (1.0 - self.slats_phase);

        let w = self.surface.width();
        let h = self.surface.height();
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let (sin, cos) = self.angle.sin_cos();
        let color = tile.color;

        // Pattern row for device pixel (x, y): inverse of the layer rotation
        // about the centre, then the scroll offset
        for y in 0..h {
            let dy = y as f32 + 0.5 - cy;
            let Some(row) = self.surface.row_mut(y) else {
                continue;
            };
            for (x, px) in row.iter_mut().enumerate() {
                let dx = x as f32 + 0.5 - cx;
                let pattern_y = -dx * sin + dy * cos + cy - offset;
                let coverage = tile.sample(pattern_y);
                if coverage > 0.0 {
                    *px = BlendMode::Lighter.apply(*px, color, alpha * coverage);
                }
            }
        }
    }

    fn draw_band(&mut self, p: &FrameParams) {
        let h = self.surface.height() as f32;
        let speed = 0.15 + 0.6 * p.intensity;
        let center = (p.t * speed).rem_euclid(1.0) * h;
        let half = (h * 0.18).max(100.0 * p.dpr) / 2.0;
        let peak = self.config.band_alpha + self.config.band_alpha_gain * p.intensity;

        let y0 = (center - half).floor().max(0.0) as u32;
        let y1 = ((center + half).ceil().max(0.0) as u32).min(self.surface.height());
        for y in y0..y1 {
            let distance = ((y as f32 + 0.5) - center).abs() / half;
            let alpha = peak * (1.0 - distance).max(0.0);
            if alpha <= 0.0 {
                continue;
            }
            if let Some(row) = self.surface.row_mut(y) {
                for px in row.iter_mut() {
                    *px = BlendMode::Lighter.apply(*px, Rgb::WHITE, alpha);
                }
            }
        }
    }

    fn draw_scanlines(&mut self, p: &FrameParams) {
        let base_pitch = self.config.scanline_pitch.max(1);
        let pitch = base_pitch.max((base_pitch as f32 / p.dpr).floor() as u32);
        let alpha = 0.7 * (self.config.scanline_alpha + self.config.scanline_alpha_gain * p.intensity);

        let mut y = 0;
        while y < self.surface.height() {
            if let Some(row) = self.surface.row_mut(y) {
                for px in row.iter_mut() {
                    *px = BlendMode::Replace.apply(*px, Rgb::BLACK, alpha);
                }
            }
            y += pitch;
        }
    }

    fn draw_grain(&mut self, p: &FrameParams) {
        let c = &self.config;
        let (w, h) = (self.surface.width() as f32, self.surface.height() as f32);
        let count = (w * h / c.noise_density_div * (1.0 + c.grain_intensity_gain * p.intensity))
            .floor() as usize;
        let alpha = c.grain_alpha + c.grain_alpha_gain * p.intensity;
        let spread = (c.grain_size_spread + c.grain_size_gain * p.intensity) * p.dpr;
        let base = c.grain_size * p.dpr;

        for _ in 0..count {
            let gx = self.rng.gen::<f32>() * w;
            let gy = self.rng.gen::<f32>() * h;
            let size = base + self.rng.gen::<f32>() * spread;
            self.surface
                .fill_rect(gx, gy, size, size, Rgb::WHITE, alpha, BlendMode::Lighter);
        }
    }

    fn draw_vignette(&mut self) {
        let h = self.surface.height() as f32;
        let strength = self.config.vignette_alpha;
        self.radial(h * 0.2, h * 0.72, Rgb::BLACK, BlendMode::Replace, |s| {
            strength * s
        });
    }

    /// Blend a centred radial gradient; `alpha_at(s)` maps the normalized
    /// radius `s` (0 at `inner`, 1 at `outer`, clamped) to an alpha
    fn radial(
        &mut self,
        inner: f32,
        outer: f32,
        color: Rgb,
        mode: BlendMode,
        alpha_at: impl Fn(f32) -> f32,
    ) {
        let w = self.surface.width();
        let h = self.surface.height();
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let span = (outer - inner).max(f32::EPSILON);

        for y in 0..h {
            let dy = y as f32 + 0.5 - cy;
            let Some(row) = self.surface.row_mut(y) else {
                continue;
            };
            for (x, px) in row.iter_mut().enumerate() {
                let dx = x as f32 + 0.5 - cx;
                let s = (((dx * dx + dy * dy).sqrt() - inner) / span).clamp(0.0, 1.0);
                let alpha = alpha_at(s);
                if alpha > 0.0 {
                    *px = mode.apply(*px, color, alpha);
                }
            }
        }
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn slats_phase(&self) -> f32 {
        self.slats_phase
    }

    /// Current slat tilt (radians)
    pub fn slat_angle(&self) -> f32 {
        self.angle
    }

    pub fn slat_angle_target(&self) -> f32 {
        self.angle_target
    }

    pub fn tile(&self) -> Option<&SlatTile> {
        self.tile.as_ref()
    }

    pub fn stats(&self) -> BackdropStats {
        self.stats
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }
}

impl std::fmt::Debug for ProceduralBackdropRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProceduralBackdropRenderer")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .field("dpr", &self.dpr)
            .field("running", &self.frame_loop.is_running())
            .field("visible", &self.visible)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Sampling bound for a configured spread: NaN is zero, infinity is `f32::MAX`
fn magnitude(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.abs().min(f32::MAX)
    }
}

fn retarget_interval(config: &BackdropConfig, rng: &mut StdRng) -> f32 {
    let lo = magnitude(config.slat_retarget_min_s.max(0.0));
    let hi = magnitude(config.slat_retarget_max_s.max(lo));
    lo + rng.gen::<f32>() * (hi - lo)
}

/// Pull frame rate and pixel ratio cap into the supported ranges
fn clamp_config(mut config: BackdropConfig) -> BackdropConfig {
    let fps = config.target_fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS);
    if fps != config.target_fps {
        warn!(requested = config.target_fps, used = fps, "backdrop target fps clamped");
        config.target_fps = fps;
    }

    let cap = if config.dpr_cap.is_finite() {
        config.dpr_cap.clamp(MIN_DPR_CAP, MAX_DPR_CAP)
    } else {
        1.0
    };
    if cap != config.dpr_cap {
        warn!(requested = config.dpr_cap, used = cap, "backdrop dpr cap clamped");
        config.dpr_cap = cap;
    }

    let min_div = BackdropConfig::MIN_NOISE_DENSITY_DIV;
    if !(config.noise_density_div >= min_div) {
        warn!(requested = config.noise_density_div, used = min_div, "backdrop grain density clamped");
        config.noise_density_div = min_div;
    }
    if !(config.grain_intensity_gain.is_finite() && config.grain_intensity_gain >= 0.0) {
        warn!(requested = config.grain_intensity_gain, "backdrop grain gain reset");
        config.grain_intensity_gain = 0.0;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(config: BackdropConfig) -> ProceduralBackdropRenderer {
        let mut renderer = ProceduralBackdropRenderer::with_seed(config, 17);
        renderer.resize(64.0, 48.0, 1.0).unwrap();
        renderer
    }

    #[test]
    fn test_stopped_until_started() {
        let mut r = renderer(BackdropConfig::default());
        assert_eq!(r.tick(FrameTime::ZERO, 0.0), BackdropTick::Stopped);

        r.start(FrameTime::ZERO);
        assert_eq!(r.tick(FrameTime::ZERO, 0.0), BackdropTick::Drawn);
        assert!(r.surface().mean_luma() > 0.0);
    }

    #[test]
    fn test_throttles_display_rate() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);

        // Two seconds of 60 Hz callbacks
        let mut drawn = 0;
        for frame in 0..120 {
            if r.tick(FrameTime::from_micros(frame * 16_667), 0.5) == BackdropTick::Drawn {
                drawn += 1;
            }
        }
        assert!(drawn <= 60);
        assert!(drawn >= 59);
        assert_eq!(r.stats().frames_drawn + r.stats().frames_skipped, 120);
    }

    #[test]
    fn test_dpr_cap() {
        let mut r = ProceduralBackdropRenderer::with_seed(BackdropConfig::default(), 1);
        r.resize(100.0, 50.0, 3.0).unwrap();
        assert_eq!(r.dpr(), 1.0);
        assert_eq!((r.surface().width(), r.surface().height()), (100, 50));

        let mut r = ProceduralBackdropRenderer::with_seed(BackdropConfig::classic(), 1);
        r.resize(100.5, 50.0, 3.0).unwrap();
        assert_eq!(r.dpr(), 2.0);
        assert_eq!((r.surface().width(), r.surface().height()), (201, 100));
    }

    #[test]
    fn test_out_of_range_config_is_clamped() {
        let config = BackdropConfig {
            target_fps: 1_000,
            dpr_cap: 10.0,
            ..BackdropConfig::default()
        };
        let r = ProceduralBackdropRenderer::with_seed(config, 1);
        assert_eq!(r.config().target_fps, MAX_TARGET_FPS);
        assert_eq!(r.config().dpr_cap, MAX_DPR_CAP);
    }

    #[test]
    fn test_grain_density_is_clamped() {
        let config = BackdropConfig {
            noise_density_div: 1e-6,
            grain_intensity_gain: f32::INFINITY,
            ..BackdropConfig::default()
        };
        let mut r = renderer(config);
        assert_eq!(r.config().noise_density_div, BackdropConfig::MIN_NOISE_DENSITY_DIV);
        assert_eq!(r.config().grain_intensity_gain, 0.0);

        r.start(FrameTime::ZERO);
        assert_eq!(r.tick(FrameTime::ZERO, 1.0), BackdropTick::Drawn);
    }

    #[test]
    fn test_extreme_tilt_spreads_do_not_panic() {
        for (angle, min_s, max_s) in [
            (f32::MAX, 0.0, f32::INFINITY),
            (f32::INFINITY, f32::NAN, f32::MAX),
            (f32::NAN, 0.0, 0.0),
        ] {
            let config = BackdropConfig {
                slat_max_angle_deg: angle,
                slat_retarget_min_s: min_s,
                slat_retarget_max_s: max_s,
                ..BackdropConfig::default()
            };
            let mut r = renderer(config);
            r.start(FrameTime::ZERO);
            for frame in 0..90 {
                r.tick(FrameTime::from_micros(frame * 33_334), 0.5);
                assert!(r.slat_angle_target().is_finite());
            }
        }
    }

    #[test]
    fn test_resize_invalidates_tile() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);
        r.tick(FrameTime::ZERO, 0.0);
        assert_eq!(r.stats().tile_rebuilds, 1);
        assert_eq!(r.tile().unwrap().slat_height, 8.0);

        let mut r2 = ProceduralBackdropRenderer::with_seed(BackdropConfig::classic(), 1);
        r2.resize(64.0, 48.0, 1.0).unwrap();
        r2.start(FrameTime::ZERO);
        r2.tick(FrameTime::ZERO, 0.0);
        r2.resize(64.0, 48.0, 2.0).unwrap();
        r2.tick(FrameTime::from_millis(20), 0.0);
        assert_eq!(r2.stats().tile_rebuilds, 2);
        assert_eq!(r2.tile().unwrap().slat_height, 16.0);
    }

    #[test]
    fn test_tile_refresh_is_periodic_not_per_frame() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);

        // One second at 60 Hz: ~30 draws, tile rebuilt every 250 ms
        for frame in 0..60 {
            r.tick(FrameTime::from_micros(frame * 16_667), 0.0);
        }
        let stats = r.stats();
        assert!(stats.frames_drawn >= 29);
        assert!(stats.tile_rebuilds >= 4 && stats.tile_rebuilds <= 5);
    }

    #[test]
    fn test_hidden_cancels_and_restarts_fresh() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);
        r.tick(FrameTime::ZERO, 0.0);

        r.set_visible(false, FrameTime::from_secs_f64(1.0));
        assert!(!r.is_running());
        assert_eq!(r.tick(FrameTime::from_secs_f64(2.0), 0.0), BackdropTick::Stopped);

        r.set_visible(true, FrameTime::from_secs_f64(30.0));
        assert!(r.is_running());
        // First frame after the restart always draws
        assert_eq!(r.tick(FrameTime::from_secs_f64(30.0), 0.0), BackdropTick::Drawn);
    }

    #[test]
    fn test_visible_does_not_override_stop() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);
        r.set_visible(false, FrameTime::ZERO);
        r.stop();
        r.stop();
        r.set_visible(true, FrameTime::from_millis(10));
        assert!(!r.is_running());
    }

    #[test]
    fn test_intensity_brightens() {
        let mut calm = renderer(BackdropConfig::default());
        let mut loud = renderer(BackdropConfig::default());
        calm.start(FrameTime::ZERO);
        loud.start(FrameTime::ZERO);

        calm.tick(FrameTime::ZERO, 0.0);
        loud.tick(FrameTime::ZERO, 1.0);
        assert!(loud.surface().mean_luma() > calm.surface().mean_luma());
    }

    #[test]
    fn test_slats_phase_zero_hides_slats() {
        let mut with = renderer(BackdropConfig::default());
        let mut without = renderer(BackdropConfig::default());
        without.set_slats_phase(0.0);
        with.start(FrameTime::ZERO);
        without.start(FrameTime::ZERO);

        with.tick(FrameTime::ZERO, 0.0);
        without.tick(FrameTime::ZERO, 0.0);
        assert!(with.surface().mean_luma() > without.surface().mean_luma());
        assert_eq!(without.slats_phase(), 0.0);
    }

    #[test]
    fn test_tilt_eases_within_bounds() {
        let mut r = renderer(BackdropConfig::default());
        r.start(FrameTime::ZERO);
        assert_eq!(r.slat_angle(), INITIAL_SLAT_ANGLE);

        let max = 25f32.to_radians();
        let mut previous_target = r.slat_angle_target();
        let mut retargets = 0;
        for frame in 0..(30 * 20) {
            r.tick(FrameTime::from_micros(frame * 33_334), 0.0);
            let target = r.slat_angle_target();
            if target != previous_target {
                retargets += 1;
                previous_target = target;
            }
            assert!(target.abs() <= max + 1e-6);
        }
        // 20 s with a 2-4 s retarget interval
        assert!((4..=10).contains(&retargets));
        assert!(r.slat_angle().abs() <= max + 1e-6);
    }

    #[test]
    fn test_empty_surface_still_ticks() {
        let mut r = ProceduralBackdropRenderer::with_seed(BackdropConfig::default(), 3);
        r.start(FrameTime::ZERO);
        assert_eq!(r.tick(FrameTime::ZERO, 1.0), BackdropTick::Drawn);
        assert!(r.surface().is_empty());
    }

    #[test]
    fn test_vignette_darkens_corners() {
        let config = BackdropConfig {
            bloom_alpha: 0.0,
            slat_alpha: 0.0,
            slat_alpha_gain: 0.0,
            band_alpha: 0.0,
            band_alpha_gain: 0.0,
            scanline_alpha: 0.0,
            scanline_alpha_gain: 0.0,
            grain_alpha: 0.0,
            grain_alpha_gain: 0.0,
            ..BackdropConfig::default()
        };
        let mut r = renderer(config);
        r.start(FrameTime::ZERO);
        r.tick(FrameTime::ZERO, 0.0);

        let surface = r.surface();
        let centre = surface.pixel(32, 24).unwrap();
        let corner = surface.pixel(63, 24).unwrap();
        // Same gradient row; only the vignette differs
        assert!(corner.luma() < centre.luma());
    }
}
