// Run with:  cargo bench --bench encode

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use keidei_dbi::mipi::MipiDbi;
use keidei_dbi::transport::{Line, Transport};
use keidei_dbi::{ProtocolEncoder, Variant};
use std::hint::black_box;

const PIXELS: usize = 480 * 320;

/// Counts bytes instead of moving them.
#[derive(Default)]
struct Sink {
    bytes: usize,
}

impl Transport for Sink {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<(), ()> {
        self.bytes += black_box(buf).len();
        Ok(())
    }

    fn acquire_line(&mut self, _line: Line) -> Result<(), ()> {
        Ok(())
    }

    fn set_line(&mut self, _line: Line, _high: bool) -> Result<(), ()> {
        Ok(())
    }
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(PIXELS as u64));

    let pixels: Vec<u16> = (0..PIXELS).map(|i| i as u16).collect();

    for variant in [Variant::V20, Variant::V50, Variant::V60] {
        let encoder = variant.encoder();
        group.bench_function(variant.name(), |b| {
            let mut sink = Sink::default();
            b.iter(|| encoder.write_memory(&mut sink, black_box(&pixels)));
        });
    }

    group.bench_function("mipi_dbi", |b| {
        let encoder = MipiDbi::new();
        let mut sink = Sink::default();
        b.iter(|| encoder.write_memory(&mut sink, black_box(&pixels)));
    });

    group.finish();
}

criterion_group!(benches, encode);
criterion_main!(benches);
