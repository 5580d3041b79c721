use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use deferred_list::DeferredList;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_interleaved_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("interleaved edits");

    for item_count in [1_000, 10_000, 100_000] {
        group.bench_function(format!("naive vec {item_count}"), |b| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                let mut items: Vec<u64> = (0..item_count).collect();
                for i in 0..1_000u64 {
                    let index = rng.random_range(0..items.len());
                    if i % 2 == 0 {
                        items.insert(index, i);
                    } else {
                        items.remove(index);
                    }
                }
                items
            });
        });

        group.bench_function(format!("deferred list {item_count}"), |b| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                let mut list: DeferredList<u64> = (0..item_count).collect();
                for i in 0..1_000u64 {
                    let index = rng.random_range(0..list.len());
                    if i % 2 == 0 {
                        list.insert(index, i).unwrap();
                    } else {
                        list.remove(index).unwrap();
                    }
                }
                list
            });
        });
    }
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for pending in [100, 1_000, 10_000] {
        group.bench_function(format!("{pending} pending edits"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(0);
                    let mut list: DeferredList<u64> = (0..100_000u64)
                        .collect::<DeferredList<_>>()
                        .with_auto_commit_height(usize::MAX);
                    for i in 0..pending {
                        let index = rng.random_range(0..list.len());
                        list.insert(index, i).unwrap();
                    }
                    list
                },
                |mut list| {
                    list.commit().unwrap();
                    list
                },
                BatchSize::LargeInput,
            );
        });
    }
}

fn bench_point_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("point reads");

    let mut list: DeferredList<u64> = (0..100_000u64)
        .collect::<DeferredList<_>>()
        .with_auto_commit_height(usize::MAX);
    list.commit().unwrap();

    group.bench_function("settled", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| {
            let index = rng.random_range(0..list.len());
            *list.get(index).unwrap()
        });
    });

    let mut rng = StdRng::seed_from_u64(0);
    for i in 0..1_000 {
        let index = rng.random_range(0..list.len());
        list.insert(index, i).unwrap();
    }

    group.bench_function("1000 pending edits", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| {
            let index = rng.random_range(0..list.len());
            *list.get(index).unwrap()
        });
    });
}

criterion_group!(benches, bench_interleaved_edits, bench_commit, bench_point_reads);
criterion_main!(benches);
