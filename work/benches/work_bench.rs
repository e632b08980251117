use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use powork_work::{verify_batch, verify_work, WorkGenerator, WorkItem};

fn payload() -> [u8; 32] {
    let mut data = [0u8; 32];
    for (i, byte) in data.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(31).wrapping_add(7);
    }
    data
}

fn bench_pow_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow_generation");
    let data = payload();
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get()) as isize;

    // Difficulties low enough to finish quickly under the benchmark harness.
    for workers in [1, cpus, cpus * 2] {
        let generator = WorkGenerator::new(workers);
        for difficulty in [0u64, 0xff00_0000_0000_0000, 0xfff0_ffc0_0000_0000] {
            group.bench_with_input(
                BenchmarkId::new(format!("generate/{workers}"), format!("{difficulty:016x}")),
                &difficulty,
                |b, &diff| b.iter(|| black_box(generator.generate(black_box(&data), black_box(diff)))),
            );
        }
    }

    group.finish();
}

fn bench_pow_validation(c: &mut Criterion) {
    let data = payload();
    let difficulty = 0xff00_0000_0000_0000u64;
    let nonce = WorkGenerator::new(1).generate(&data, difficulty);

    c.bench_function("pow_validate_valid", |b| {
        b.iter(|| black_box(verify_work(black_box(&data), black_box(difficulty), black_box(nonce.0))))
    });

    c.bench_function("pow_validate_hard", |b| {
        b.iter(|| {
            black_box(verify_work(
                black_box(&data),
                black_box(0xffff_ffc0_0000_0000),
                black_box(123),
            ))
        })
    });
}

fn bench_pow_validation_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow_validation_batch");
    let generator = WorkGenerator::new(1);

    let payloads: Vec<[u8; 32]> = (0u8..64).map(|i| [i; 32]).collect();
    let nonces: Vec<u64> = payloads
        .iter()
        .map(|p| generator.generate(p, 0xf000_0000_0000_0000).0)
        .collect();
    let items: Vec<WorkItem<'_>> = payloads
        .iter()
        .zip(&nonces)
        .map(|(payload, &nonce)| WorkItem {
            payload,
            difficulty: 0xf000_0000_0000_0000,
            nonce,
        })
        .collect();

    group.bench_function("verify_64_sequential", |b| {
        b.iter(|| {
            for item in &items {
                black_box(verify_work(item.payload, item.difficulty, item.nonce));
            }
        })
    });

    group.bench_function("verify_64_batch", |b| b.iter(|| black_box(verify_batch(&items))));

    group.finish();
}

criterion_group!(
    benches,
    bench_pow_generation,
    bench_pow_validation,
    bench_pow_validation_batch,
);
criterion_main!(benches);
