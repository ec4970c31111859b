use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agg_scanline::scanline::{Scanline, ScanlineGenerator};
use agg_scanline::scanline_boolean_algebra::{sbool_combine_storages_aa, SBoolOp};
use agg_scanline::scanline_p::Scanline32P8;
use agg_scanline::scanline_serialization::SerializedScanlinesAdaptorAa8;
use agg_scanline::scanline_storage_aa::ScanlineStorageAa8;
use strum::IntoEnumIterator;

/// A disc of radius `r` centered at `(cx, cy)`, with an anti-aliased
/// one-pixel rim on each side of every row.
fn disc(cx: i32, cy: i32, r: i32) -> ScanlineStorageAa8 {
    let mut st = ScanlineStorageAa8::new();
    let mut sl = Scanline32P8::new();
    sl.reset(cx - r - 2, cx + r + 2);
    for y in -r..=r {
        let half = (((r * r - y * y) as f64).sqrt()) as i32;
        let rim = (128 + y.abs() % 100) as u8;
        sl.reset_spans();
        sl.add_cell(cx - half - 1, rim as u32);
        sl.add_span(cx - half, (2 * half + 1) as u32, 255);
        sl.add_cell(cx + half + 1, rim as u32);
        sl.finalize(cy + y);
        st.render(&sl);
    }
    st
}

fn bench_ops(c: &mut Criterion) {
    let mut a = disc(300, 300, 250);
    let mut b = disc(450, 350, 220);
    let mut out = ScanlineStorageAa8::new();

    let mut group = c.benchmark_group("sbool");
    for op in SBoolOp::iter() {
        group.bench_with_input(BenchmarkId::from_parameter(op), &op, |bench, &op| {
            bench.iter(|| {
                sbool_combine_storages_aa(op, &mut a, &mut b, &mut out);
                black_box(out.num_scanlines())
            })
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let st = disc(500, 500, 480);
    let data = st.serialize_to_vec();

    c.bench_function("serialize", |bench| {
        let mut buf = vec![0u8; st.byte_size()];
        bench.iter(|| black_box(st.serialize(&mut buf)))
    });

    c.bench_function("adaptor_sweep", |bench| {
        let mut sl = Scanline32P8::new();
        bench.iter(|| {
            let mut ad = SerializedScanlinesAdaptorAa8::from_bytes(&data);
            let mut rows = 0;
            if ad.rewind_scanlines() {
                sl.reset(ad.min_x(), ad.max_x());
                while ad.sweep_scanline(&mut sl) {
                    rows += 1;
                }
            }
            black_box(rows)
        })
    });
}

criterion_group!(benches, bench_ops, bench_serialize);
criterion_main!(benches);
