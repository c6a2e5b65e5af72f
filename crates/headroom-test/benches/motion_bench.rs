//! Benchmarks for per-frame motion updates

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use headroom_core::{AvatarProfile, FrameTime};
use headroom_motion::{GlitchPerturber, IntensitySmoother, MouthArticulator};
use headroom_runtime::VoiceSink;
use headroom_test::{avatar_rig, test_engine, SyntheticSpeech};

const DT: f32 = 1.0 / 60.0;

fn bench_smoother_update(c: &mut Criterion) {
    let profile = AvatarProfile::default();
    let mut smoother = IntensitySmoother::new(profile.smoothing);

    c.bench_function("smoother_update", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            let target: f32 = if i % 120 < 60 { 1.0 } else { 0.0 };
            black_box(smoother.update(black_box(target), DT))
        })
    });
}

fn bench_mouth_update(c: &mut Criterion) {
    let profile = AvatarProfile::expressive();
    let mut scene = avatar_rig(&profile.nodes, profile.glitch.base_scale);
    let mut mouth = MouthArticulator::with_seed(
        profile.talk.clone(),
        profile.jaw.clone(),
        profile.upper_jaw.clone(),
        profile.tongue.clone(),
        &profile.nodes,
        1,
    );
    let mut speech = SyntheticSpeech::new(2);

    c.bench_function("mouth_update", |b| {
        b.iter(|| {
            let level = speech.next(DT);
            black_box(mouth.update(black_box(level), DT, &mut scene))
        })
    });
}

fn bench_glitch_update(c: &mut Criterion) {
    let profile = AvatarProfile::default();
    let mut scene = avatar_rig(&profile.nodes, profile.glitch.base_scale);
    let mut glitch = GlitchPerturber::with_seed(profile.glitch.clone(), profile.nodes.root.clone(), 3);

    c.bench_function("glitch_update", |b| {
        let mut frame = 0i64;
        b.iter(|| {
            frame += 1;
            let now = FrameTime::from_micros(frame * 16_667);
            let actual = if frame % 240 < 120 { 1.0 } else { 0.0 };
            glitch.update(black_box(actual), now, DT, &mut scene);
            black_box(glitch.poll_timer(now, &mut scene))
        })
    });
}

fn bench_engine_frame(c: &mut Criterion) {
    let mut engine = test_engine(AvatarProfile::default(), 4).expect("engine");
    engine.start(FrameTime::ZERO);
    engine.report_glitch_intensity(1.0);
    engine.report_speech_intensity(0.7);

    c.bench_function("engine_frame", |b| {
        let mut frame = 0i64;
        b.iter(|| {
            frame += 1;
            let now = FrameTime::from_micros(frame * 16_667);
            black_box(engine.frame(now, DT))
        })
    });
}

criterion_group!(
    benches,
    bench_smoother_update,
    bench_mouth_update,
    bench_glitch_update,
    bench_engine_frame,
);
criterion_main!(benches);
