use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use patternkit_geometry::{
    compute_measures, offset_figure_with, snap, DrawingTool, Figure, GeometryCache,
    MeasureOptions, OffsetOptions, Point, SnapContext, SnapOptions,
};
use std::hint::black_box;

fn wavy_piece(points: usize) -> Figure {
    let outline: Vec<Point> = (0..points)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / points as f64;
            let r = 200.0 + 15.0 * (a * 6.0).sin();
            Point::new(r * a.cos(), r * a.sin())
        })
        .collect();
    Figure::polyline("wavy", DrawingTool::Curve, &outline, true)
}

fn bench_measures(c: &mut Criterion) {
    let circle = Figure::circle("c", 0.0, 0.0, 120.0);
    c.bench_function("measures_circle", |b| {
        b.iter(|| black_box(compute_measures(black_box(&circle))))
    });

    let cache = GeometryCache::new();
    let options = MeasureOptions::default();
    c.bench_function("measures_circle_cached", |b| {
        b.iter(|| black_box(cache.measures(black_box(&circle), &options)))
    });
}

fn bench_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("seam_offset");
    let options = OffsetOptions::default();

    group.bench_function("circle", |b| {
        let circle = Figure::circle("c", 0.0, 0.0, 120.0);
        b.iter(|| black_box(offset_figure_with(black_box(&circle), 1.0, &options)))
    });

    for &points in &[32usize, 256, 1024] {
        let piece = wavy_piece(points);
        group.bench_with_input(BenchmarkId::new("polyline", points), &piece, |b, piece| {
            b.iter(|| black_box(offset_figure_with(black_box(piece), 1.0, &options)))
        });
    }
    group.finish();
}

fn bench_snapping(c: &mut Criterion) {
    let figures: Vec<Figure> = (0..50)
        .map(|i| {
            let mut f = Figure::rectangle(format!("piece-{}", i), 0.0, 0.0, 80.0, 120.0);
            f.transform.x = (i % 10) as f64 * 100.0;
            f.transform.y = (i / 10) as f64 * 150.0;
            f
        })
        .collect();
    let ctx = SnapContext::from_figures(&figures, None, SnapOptions::default(), 1.0);
    let queries: Vec<Point> = (0..256)
        .map(|i| Point::new((i * 37 % 1000) as f64 + 0.5, (i * 13 % 750) as f64 + 0.5))
        .collect();

    c.bench_function("snap_batch", |b| {
        b.iter(|| {
            let hits = queries
                .iter()
                .filter(|p| snap(black_box(**p), &ctx).is_some())
                .count();
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_measures, bench_offset, bench_snapping);
criterion_main!(benches);
