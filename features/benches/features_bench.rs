use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voxguard_features::{Extractor, ExtractorConfig, Pyin, PyinConfig};

fn voiced(seconds: usize) -> Vec<f32> {
    let sr = 16000.0;
    (0..16000 * seconds)
        .map(|i| {
            let t = i as f64 / sr;
            let phase = 2.0 * PI * 180.0 * t;
            (0.4 * phase.sin() + 0.2 * (2.0 * phase).sin()) as f32
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let extractor = Extractor::new(ExtractorConfig::default()).expect("default config");
    let samples = voiced(4);
    c.bench_function("extract_4s", |b| {
        b.iter(|| {
            let _ = black_box(extractor.extract(black_box(&samples)));
        })
    });
}

fn bench_pitch(c: &mut Criterion) {
    let pyin = Pyin::new(PyinConfig::default(), 16000).expect("default config");
    let samples = voiced(4);
    c.bench_function("pyin_4s", |b| b.iter(|| pyin.track(black_box(&samples))));
}

criterion_group!(benches, bench_extract, bench_pitch);
criterion_main!(benches);
