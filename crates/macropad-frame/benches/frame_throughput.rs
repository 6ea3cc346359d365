//! Frame codec throughput benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use macropad_frame::{FrameCodec, FrameMode};

fn sample_payload() -> Vec<u8> {
    let mut payload = br#"{"Config":{"header":{"version":65536},"config":{"settings":{},"mappings":{"#.to_vec();
    for slot in 1..=32 {
        if slot > 1 {
            payload.push(b',');
        }
        payload.extend(format!(r#""{slot}":[{{"KeyPress":{{"keys":["KeyA"]}}}},"KeyRelease"]"#).bytes());
    }
    payload.extend(b"}}}}");
    payload
}

fn bench_framed_encode(c: &mut Criterion) {
    let codec = FrameCodec::new(FrameMode::Framed);
    let payload = sample_payload();

    c.bench_function("framed_encode", |b| {
        b.iter(|| {
            black_box(codec.encode(black_box(&payload)).expect("encode"));
        })
    });
}

fn bench_framed_decode_chunked(c: &mut Criterion) {
    let codec = FrameCodec::new(FrameMode::Framed);
    let bytes = codec.encode(&sample_payload()).expect("encode");

    c.bench_function("framed_decode_64b_chunks", |b| {
        b.iter(|| {
            let mut decoder = codec.decoder();
            let mut result = None;
            for chunk in bytes.chunks(64) {
                result = decoder.feed(chunk).expect("decode");
            }
            black_box(result);
        })
    });
}

fn bench_raw_decode_chunked(c: &mut Criterion) {
    let codec = FrameCodec::new(FrameMode::Raw);
    let payload = sample_payload();

    c.bench_function("raw_decode_64b_chunks", |b| {
        b.iter(|| {
            let mut decoder = codec.decoder();
            let mut result = None;
            for chunk in payload.chunks(64) {
                result = decoder.feed(chunk).expect("decode");
            }
            black_box(result);
        })
    });
}

criterion_group!(
    benches,
    bench_framed_encode,
    bench_framed_decode_chunked,
    bench_raw_decode_chunked
);
criterion_main!(benches);
