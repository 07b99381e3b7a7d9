//! Benchmarks for NFP generation and small arrangements.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use platen_arrange::{Arranger, ArrangeConfig, Bin, Item};
use platen_core::minkowski::nfp_convex;
use platen_core::{Aabb, Point};

/// Regular n-gon with the given radius in scaled units.
fn ngon(n: usize, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            Point::new((radius * a.cos()).round() as i64, (radius * a.sin()).round() as i64)
        })
        .collect()
}

fn bench_nfp_convex(c: &mut Criterion) {
    let mut group = c.benchmark_group("nfp_convex");
    for &n in &[8usize, 32, 128] {
        let stationary = ngon(n, 10_000_000.0);
        let orbiting = ngon(n, 6_000_000.0);
        group.bench_with_input(BenchmarkId::new("ngon", n), &n, |b, _| {
            b.iter(|| nfp_convex(black_box(&stationary), black_box(&orbiting)))
        });
    }
    group.finish();
}

fn bench_arrange_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("arranger");
    group.sample_size(10);

    for &n in &[5usize, 10, 20] {
        group.bench_with_input(BenchmarkId::new("squares", n), &n, |b, &n| {
            b.iter(|| {
                let side = 10_000_000;
                let parts: Vec<Item> = (0..n)
                    .map(|_| {
                        Item::new(
                            vec![
                                Point::new(0, 0),
                                Point::new(side, 0),
                                Point::new(side, side),
                                Point::new(0, side),
                            ],
                            Point::zero(),
                            0.0,
                        )
                        .unwrap()
                    })
                    .collect();
                let bin = Bin::Rect(Aabb::new(
                    Point::zero(),
                    Point::new(100_000_000, 100_000_000),
                ));
                let mut arranger =
                    Arranger::new(bin, ArrangeConfig::default(), parts, Vec::new());
                black_box(arranger.execute(None, None))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nfp_convex, bench_arrange_squares);
criterion_main!(benches);
