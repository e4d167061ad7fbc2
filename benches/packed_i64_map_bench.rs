use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use packed_i64_map::PackedI64Map;
use std::collections::HashMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = i64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s as i64)
    })
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("packed::insert_fresh_100k", |b| {
        b.iter_batched(
            PackedI64Map::new,
            |mut m| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    m.insert(k, i as i64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("std::insert_fresh_100k", |b| {
        b.iter_batched(
            HashMap::<i64, i64>::new,
            |mut m| {
                for (i, k) in lcg(1).take(100_000).enumerate() {
                    m.insert(k, i as i64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_overwrite_100k(c: &mut Criterion) {
    c.bench_function("packed::overwrite_100k", |b| {
        b.iter_batched(
            || {
                let mut m = PackedI64Map::new();
                for (i, k) in lcg(2).take(100_000).enumerate() {
                    m.insert(k, i as i64);
                }
                m
            },
            |mut m| {
                for k in lcg(2).take(100_000) {
                    m.insert(k, -1);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_all_100k(c: &mut Criterion) {
    // Includes every shrink on the way down to the floor.
    c.bench_function("packed::remove_all_100k", |b| {
        b.iter_batched(
            || {
                let mut m = PackedI64Map::new();
                for (i, k) in lcg(5).take(100_000).enumerate() {
                    m.insert(k, i as i64);
                }
                m
            },
            |mut m| {
                for k in lcg(5).take(100_000) {
                    let _ = m.remove(k);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("packed::get_hit_10k_on_100k", |b| {
        let mut m = PackedI64Map::new();
        let keys: Vec<i64> = lcg(7).take(100_000).collect();
        for (i, &k) in keys.iter().enumerate() {
            m.insert(k, i as i64);
        }
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<i64> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n]
            })
            .collect();
        b.iter(|| {
            for &k in &queries {
                let _ = black_box(m.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("packed::get_miss_10k_on_100k", |b| {
        let mut m = PackedI64Map::new();
        for (i, k) in lcg(11).take(100_000).enumerate() {
            m.insert(k, i as i64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = miss.next().unwrap_or_default();
                let _ = black_box(m.get(k));
            }
        })
    });
}

fn bench_churn_10k(c: &mut Criterion) {
    // Steady-state insert/remove at constant size; exercises tombstone
    // build-up and the rebuilds that purge it.
    c.bench_function("packed::churn_10k_at_1k_live", |b| {
        b.iter_batched(
            || {
                let mut m = PackedI64Map::new();
                for k in 0..1_000 {
                    m.insert(k, k);
                }
                m
            },
            |mut m| {
                for k in 1_000..11_000 {
                    let _ = m.remove(k - 1_000);
                    m.insert(k, k);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_overwrite_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_all_100k,
              bench_get_hit_10k,
              bench_get_miss_10k,
              bench_churn_10k
}
criterion_main!(benches_insert, benches_ops);
