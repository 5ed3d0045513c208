//! Throughput benchmarks

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use serialmon_core::core::codec::{hexdump, parse_hex_input, EncodingPolicy, TextEncoding};
use std::hint::black_box;

fn codec_benchmark(c: &mut Criterion) {
    let data: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("hex_input_parse", |b| {
        let hex_str = hex::encode(&data);
        b.iter(|| {
            let decoded = parse_hex_input(black_box(&hex_str)).unwrap();
            black_box(decoded)
        })
    });

    group.bench_function("hexdump", |b| {
        b.iter(|| {
            let dump = hexdump(black_box(&data), 16);
            black_box(dump)
        })
    });

    group.finish();
}

fn encoding_benchmark(c: &mut Criterion) {
    let text = "Temperatur 21\u{b0}C, Status: bereit \u{2713}\r\n".repeat(32);

    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for encoding in [TextEncoding::Utf8, TextEncoding::Latin1, TextEncoding::Ascii] {
        group.bench_function(encoding.to_string(), |b| {
            b.iter(|| {
                let encoded = encoding
                    .encode(black_box(&text), EncodingPolicy::Substitute)
                    .unwrap();
                black_box(encoded)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, codec_benchmark, encoding_benchmark);
criterion_main!(benches);
