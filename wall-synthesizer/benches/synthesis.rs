use criterion::{black_box, criterion_group, criterion_main, Criterion};
use floorplan_features::{Feature, Geometry};
use wall_synthesizer::{WallConfig, WallSynthesizer};

/// `n` x `n` grid of adjoining square rooms
fn room_grid(n: usize) -> Vec<Feature> {
    let size = 0.002;
    (0..n * n)
        .map(|i| {
            let x = (i % n) as f64 * size;
            let y = (i / n) as f64 * size;
            Feature::new(
                "room",
                Geometry::Polygon(vec![vec![
                    [x + size, y],
                    [x + size, y + size],
                    [x, y + size],
                    [x, y],
                    [x + size, y],
                ]]),
            )
        })
        .collect()
}

fn bench_synthesis(c: &mut Criterion) {
    let synthesizer = WallSynthesizer::new(WallConfig::default());

    for n in [2, 5, 10] {
        let features = room_grid(n);
        c.bench_function(&format!("synthesize_{}x{}_rooms", n, n), |b| {
            b.iter(|| synthesizer.synthesize_features(black_box(&features)))
        });
    }
}

criterion_group!(benches, bench_synthesis);
criterion_main!(benches);
