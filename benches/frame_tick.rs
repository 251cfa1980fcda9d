use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frame_stream::camera::CameraTransform;
use frame_stream::core::{PngCodec, RenderDevice, RenderSettings, Viewport};
use frame_stream::math::AABB;
use frame_stream::scenes;
use frame_stream::traits::FrameCodec;
use glam::Vec3;

/// Benchmark: capture only (render + readback) per built-in scene
fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_320x180");
    let device = RenderDevice::software(Viewport::new(320, 180), RenderSettings::default());
    let camera = CameraTransform::at(Vec3::new(0.0, 0.5, 0.0));

    for name in scenes::BUILTIN_SCENES {
        let scene = scenes::builtin(name).expect("built-in scene");
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            b.iter(|| device.capture(black_box(scene), black_box(&camera)).unwrap())
        });
    }
    group.finish();
}

/// Benchmark: PNG encode of one captured frame
fn bench_encode(c: &mut Criterion) {
    let device = RenderDevice::software(Viewport::new(640, 360), RenderSettings::default());
    let scene = scenes::builtin("demo").expect("built-in scene");
    let bitmap = device.capture(&scene, &CameraTransform::default()).unwrap();
    let codec = PngCodec::default();

    c.bench_function("png_encode_640x360", |b| {
        b.iter(|| codec.encode(black_box(&bitmap)).unwrap())
    });
}

/// Benchmark: one full tick (capture + encode) at the default resolution
fn bench_full_tick(c: &mut Criterion) {
    let device = RenderDevice::software(Viewport::new(640, 360), RenderSettings::default());
    let scene = scenes::builtin("demo").expect("built-in scene");
    let codec = PngCodec::default();
    let camera = CameraTransform {
        yaw: 0.4,
        pitch: -0.1,
        ..CameraTransform::at(Vec3::new(1.0, 0.5, 2.0))
    };

    c.bench_function("frame_tick_640x360_demo", |b| {
        b.iter(|| {
            let bitmap = device.capture(black_box(&scene), black_box(&camera)).unwrap();
            codec.encode(&bitmap).unwrap()
        })
    });
}

/// Benchmark: mesh bounds rejection test used before triangle tests
fn bench_bounds_rejection(c: &mut Criterion) {
    let bounds = AABB::new(Vec3::new(-1.0, -2.0, -10.0), Vec3::new(1.0, 2.0, -8.0));
    let dir = Vec3::new(0.03, -0.02, -1.0).normalize();
    c.bench_function("aabb_hit_distance", |b| {
        b.iter(|| black_box(&bounds).hit_distance(black_box(Vec3::ZERO), black_box(dir)))
    });
}

criterion_group!(
    benches,
    bench_capture,
    bench_encode,
    bench_full_tick,
    bench_bounds_rejection
);
criterion_main!(benches);
