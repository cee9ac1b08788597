use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ion_json::{decode_document, encode_document, from_json_str, to_json_string, OutputFormat};

fn sample_record(id: usize) -> String {
    format!(
        "order::{{id: {id}, sku: \"SKU-{id:05}\", price: 19.99, qty: {qty}, \
         placed: 2024-03-01T10:{min:02}:00Z, tags: [new, priority], \
         note: null.string, weight: 2.5e0, tag: a, tag: b}}",
        id = id,
        qty = id % 7,
        min = id % 60,
    )
}

fn sample_list(size: usize) -> String {
    let records: Vec<String> = (0..size).map(sample_record).collect();
    format!("[{}]", records.join(", "))
}

fn benchmark_decode_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_text");

    for size in [10, 100, 500].iter() {
        let text = sample_list(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| decode_document(black_box(text.as_bytes())))
        });
    }

    group.finish();
}

fn benchmark_decode_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_binary");

    for size in [10, 100, 500].iter() {
        let value = decode_document(sample_list(*size).as_bytes()).unwrap();
        let bytes = encode_document(&value, OutputFormat::Binary).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| decode_document(black_box(bytes)))
        });
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let value = decode_document(sample_list(100).as_bytes()).unwrap();

    c.bench_function("encode_text", |b| {
        b.iter(|| encode_document(black_box(&value), OutputFormat::Text))
    });
    c.bench_function("encode_pretty", |b| {
        b.iter(|| encode_document(black_box(&value), OutputFormat::Pretty))
    });
    c.bench_function("encode_binary", |b| {
        b.iter(|| encode_document(black_box(&value), OutputFormat::Binary))
    });
}

fn benchmark_json_view(c: &mut Criterion) {
    let value = decode_document(sample_list(100).as_bytes()).unwrap();
    let json = to_json_string(&value).unwrap();

    c.bench_function("to_json_string", |b| {
        b.iter(|| to_json_string(black_box(&value)))
    });
    c.bench_function("from_json_str", |b| b.iter(|| from_json_str(black_box(&json))));
}

criterion_group!(
    benches,
    benchmark_decode_text,
    benchmark_decode_binary,
    benchmark_encode,
    benchmark_json_view
);
criterion_main!(benches);
