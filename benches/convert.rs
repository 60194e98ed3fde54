// Run with:  cargo bench --bench convert

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use keidei_dbi::convert::{rgb565_copy, xrgb8888_to_rgb565};
use std::hint::black_box;

const WIDTH: usize = 480;
const HEIGHT: usize = 320;

fn convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements((WIDTH * HEIGHT) as u64));

    let xrgb: Vec<u32> = (0..WIDTH * HEIGHT)
        .map(|i| (i as u32).wrapping_mul(0x0001_0203))
        .collect();
    let rgb565: Vec<u16> = (0..WIDTH * HEIGHT).map(|i| i as u16).collect();
    let mut dst = vec![0u16; WIDTH * HEIGHT];

    group.bench_function("xrgb8888_to_rgb565", |b| {
        b.iter(|| xrgb8888_to_rgb565(black_box(&xrgb), black_box(&mut dst), false));
    });

    group.bench_function("xrgb8888_to_rgb565_swapped", |b| {
        b.iter(|| xrgb8888_to_rgb565(black_box(&xrgb), black_box(&mut dst), true));
    });

    group.bench_function("rgb565_copy_swapped", |b| {
        b.iter(|| rgb565_copy(black_box(&rgb565), black_box(&mut dst), true));
    });

    group.finish();
}

criterion_group!(benches, convert);
criterion_main!(benches);
