use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sha256_40b_bench(c: &mut Criterion) {
    // A 32-byte payload plus an 8-byte nonce: the shape of one work attempt.
    let data = [0xABu8; 40];

    c.bench_function("sha256_40B", |b| {
        b.iter(|| powork_crypto::sha256(black_box(&data)))
    });
}

fn sha256_1kb_bench(c: &mut Criterion) {
    let data = vec![0xCDu8; 1024];

    c.bench_function("sha256_1KB", |b| {
        b.iter(|| powork_crypto::sha256(black_box(&data)))
    });
}

fn sha256_multi_bench(c: &mut Criterion) {
    let parts: Vec<&[u8]> = vec![&[1u8; 32], &[2u8; 8]];

    c.bench_function("sha256_multi_2parts", |b| {
        b.iter(|| powork_crypto::sha256_multi(black_box(&parts)))
    });
}

criterion_group!(
    benches,
    sha256_40b_bench,
    sha256_1kb_bench,
    sha256_multi_bench,
);
criterion_main!(benches);
