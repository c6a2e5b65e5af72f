//! Headroom Headless Demo
//!
//! Runs one avatar engine on the tokio driver with no display attached:
//! - Voice layer alternating speaking and listening turns
//! - Synthetic speech amplitude while speaking
//! - Periodic status lines (glitch phase, jaw, backdrop draws)
//! - Final backdrop frame written as a PNG image
//!
//! Usage: headless-demo [preset] [seconds] [output.png]

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::info;

use headroom_core::{AvatarProfile, VoiceMode};
use headroom_motion::{NodeMap, NodeTransform, Vec3};
use headroom_runtime::{init_tracing, share, spawn, AvatarEngine, DriverConfig, LogFormat, VoiceSink};

/// Length of one speaking or listening turn
const TURN: Duration = Duration::from_millis(2_500);
/// Voice-layer report period
const REPORT: Duration = Duration::from_millis(50);

fn demo_scene(profile: &AvatarProfile) -> NodeMap {
    let nodes = &profile.nodes;
    NodeMap::new()
        .with_node(nodes.root.clone(), NodeTransform::with_scale(profile.glitch.base_scale))
        .with_node(nodes.lower_jaw.clone(), NodeTransform::identity())
        .with_node(
            nodes.upper_jaw.clone(),
            NodeTransform::with_position(Vec3::new(0.0, 0.012, 0.004)),
        )
        .with_node(nodes.tongue.clone(), NodeTransform::identity())
}

/// Syllable-ish loudness from elapsed speaking time
fn speech_level(t: f32) -> f32 {
    let syllables = (t * 9.0).sin().abs();
    let phrase = 0.6 + 0.4 * (t * 1.3).sin();
    (syllables * phrase).clamp(0.0, 1.0)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info", LogFormat::Compact)?;

    let mut args = std::env::args().skip(1);
    let preset = args.next().unwrap_or_else(|| "optimized".to_string());
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);
    let output = args.next().unwrap_or_else(|| "backdrop.png".to_string());

    let profile = AvatarProfile::preset(&preset)?;
    info!(preset = %profile.name, seconds, "starting headless avatar");

    let scene = demo_scene(&profile);
    let mut engine = AvatarEngine::new(profile, Box::new(scene))?;
    engine.resize_backdrop(640.0, 360.0, 2.0)?;

    let mut shared = share(engine);
    let mut handle = spawn(Arc::clone(&shared), DriverConfig::with_fps(60))?;

    let mut ticker = time::interval(REPORT);
    let started = time::Instant::now();
    let deadline = started + Duration::from_secs(seconds);
    let mut mode = VoiceMode::Listening;
    let mut turn_started: Option<time::Instant> = None;
    let mut last_status = started;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            tick = ticker.tick() => {
                if tick >= deadline {
                    break;
                }

                let turn_elapsed = turn_started.map(|at| tick.duration_since(at));
                if turn_elapsed.map_or(true, |elapsed| elapsed >= TURN) {
                    mode = match mode {
                        VoiceMode::Listening => VoiceMode::Speaking,
                        VoiceMode::Speaking => VoiceMode::Listening,
                    };
                    turn_started = Some(tick);
                    shared.report_voice_mode(mode);
                    info!(?mode, "turn");
                } else if mode == VoiceMode::Speaking {
                    let t = turn_elapsed.unwrap_or_default().as_secs_f32();
                    shared.report_speech_intensity(speech_level(t));
                }

                if tick.duration_since(last_status) >= Duration::from_secs(1) {
                    last_status = tick;
                    let engine = shared.lock();
                    let stats = engine.stats();
                    if let Some(out) = engine.last_output() {
                        info!(
                            glitch = %out.glitch.phase,
                            rotation = out.glitch.rotation_offset,
                            jaw = out.mouth.lower_jaw.unwrap_or(0.0),
                            drawn = stats.backdrop.frames_drawn,
                            skipped = stats.backdrop.frames_skipped,
                            "status"
                        );
                    }
                }
            }
        }
    }

    handle.stop();

    let mut engine = shared.lock();
    let stats = engine.stats();
    engine.backdrop().surface().save(&output)?;
    info!(
        path = %output,
        frames = stats.frames,
        activations = stats.glitch.activations,
        rotation_jumps = stats.glitch.rotation_jumps,
        drawn = stats.backdrop.frames_drawn,
        "backdrop written"
    );
    engine.teardown();

    Ok(())
}
