//! Allocator benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use holefill_core::{Allocator, FitStrategy};

const SPACE: usize = 1 << 20;

fn bench_alloc_free_churn(c: &mut Criterion) {
    let strategies = [FitStrategy::FirstFit, FitStrategy::BestFit];
    let mut group = c.benchmark_group("alloc_free_churn");

    for strategy in strategies {
        group.bench_with_input(
            BenchmarkId::new(strategy.label(), 256),
            &strategy,
            |b, &strategy| {
                b.iter(|| {
                    let mut allocator = Allocator::new(SPACE, strategy).unwrap();
                    for id in 0..256u32 {
                        allocator.allocate(id, 64 + (id as usize % 7) * 32).unwrap();
                    }
                    // Free every other block, then refill the holes.
                    for id in (0..256u32).step_by(2) {
                        allocator.deallocate(id).unwrap();
                    }
                    for id in 0..128u32 {
                        allocator.allocate(1000 + id, 64).unwrap();
                    }
                    criterion::black_box(allocator.layout());
                });
            },
        );
    }
    group.finish();
}

fn bench_coalescing_storm(c: &mut Criterion) {
    let mut group = c.benchmark_group("coalescing_storm");

    group.bench_function("free_all_512", |b| {
        b.iter(|| {
            let mut allocator = Allocator::new(SPACE, FitStrategy::FirstFit).unwrap();
            for id in 0..512u32 {
                allocator.allocate(id, 128).unwrap();
            }
            // Freeing in address order forces a coalescing pass per free.
            for id in 0..512u32 {
                allocator.deallocate(id).unwrap();
            }
            criterion::black_box(allocator.hole_count());
        });
    });

    group.finish();
}

fn bench_compaction(c: &mut Criterion) {
    let block_counts: &[u32] = &[64, 256, 1024];
    let mut group = c.benchmark_group("compaction");

    for &count in block_counts {
        group.bench_with_input(BenchmarkId::new("fragmented", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut allocator = Allocator::new(SPACE, FitStrategy::FirstFit).unwrap();
                    for id in 0..count {
                        allocator.allocate(id, 96).unwrap();
                    }
                    for id in (0..count).step_by(2) {
                        allocator.deallocate(id).unwrap();
                    }
                    allocator
                },
                |mut allocator| {
                    allocator.compact();
                    criterion::black_box(allocator.largest_hole());
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_alloc_free_churn,
    bench_coalescing_storm,
    bench_compaction
);
criterion_main!(benches);
