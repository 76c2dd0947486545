use chunktree::{bulk, BuildMode, IncrementalTree, Sha256Digest, TreeConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn bench_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [64 * 1024, 1024 * 1024] {
        let data = sample(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("incremental", size), &data, |b, data| {
            b.iter(|| {
                let tree = IncrementalTree::<Sha256Digest>::from_reader(data.as_slice(), 2048)
                    .unwrap();
                black_box(tree.root_hash())
            })
        });

        for workers in [1, 4] {
            let config = TreeConfig {
                workers,
                mode: BuildMode::Bulk,
                ..TreeConfig::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("bulk_{}w", workers), size),
                &data,
                |b, data| {
                    b.iter(|| {
                        let tree = bulk::hash_bytes::<Sha256Digest>(data, &config).unwrap();
                        black_box(tree.root_hash())
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_builders);
criterion_main!(benches);
