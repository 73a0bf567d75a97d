//! Benchmarks for the positioning engine.
//!
//! Run with: cargo bench -p waymark-layout --bench placement_bench

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waymark_core::{Position, Rect, Size};
use waymark_layout::{PlacementRequest, place};

fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("place");
    let screen = Rect::from_size(375.0, 812.0);
    let tip = Size::new(280.0, 140.0);

    let fits_first = PlacementRequest::new(Rect::new(40.0, 120.0, 120.0, 44.0), tip, screen);
    group.bench_function("auto_first_candidate", |b| {
        b.iter(|| place(black_box(&fits_first)))
    });

    let nothing_fits =
        PlacementRequest::new(Rect::new(0.0, 60.0, 375.0, 700.0), Size::new(400.0, 300.0), screen);
    group.bench_function("auto_least_overflow", |b| {
        b.iter(|| place(black_box(&nothing_fits)))
    });

    let explicit = fits_first.position(Position::TopRight).rtl(true);
    group.bench_function("explicit_rtl", |b| b.iter(|| place(black_box(&explicit))));

    group.finish();
}

criterion_group!(benches, bench_place);
criterion_main!(benches);
