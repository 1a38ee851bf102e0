use chained_hashmap::ChainedHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Fresh inserts from the initial capacity: exercises the full doubling
// cascade 16 -> 131072.
fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainedHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

// Inserts into a map already grown to the target capacity: no rehash on the
// measured path.
fn bench_insert_warm_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_warm_100k", |b| {
        b.iter_batched(
            || {
                let mut m = ChainedHashMap::new();
                for (i, x) in lcg(2).take(110_000).enumerate() {
                    let _ = m.insert(key(x), i as u64);
                }
                for x in lcg(2).take(110_000) {
                    let _ = m.erase(key(x).as_str());
                }
                m
            },
            |mut m| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    let _ = m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    let mut m = ChainedHashMap::new();
    for (i, x) in lcg(4).take(100_000).enumerate() {
        let _ = m.insert(key(x), i as u64);
    }
    let probes: Vec<String> = lcg(4).take(10_000).map(key).collect();
    c.bench_function("chained::find_hit_10k_of_100k", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &probes {
                if m.find(k.as_str()).is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    let mut m = ChainedHashMap::new();
    for (i, x) in lcg(5).take(100_000).enumerate() {
        let _ = m.insert(key(x), i as u64);
    }
    // A disjoint key stream: misses probe a full chain before giving up.
    let probes: Vec<String> = lcg(6).take(10_000).map(|x| format!("m{x:016x}")).collect();
    c.bench_function("chained::find_miss_10k_of_100k", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for k in &probes {
                if m.find(k.as_str()).is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });
}

// Erase/reinsert churn at steady size: slot reuse plus chain unlink without
// any rehash.
fn bench_churn_10k(c: &mut Criterion) {
    c.bench_function("chained::churn_10k_over_100k", |b| {
        b.iter_batched(
            || {
                let mut m = ChainedHashMap::new();
                for (i, x) in lcg(7).take(100_000).enumerate() {
                    let _ = m.insert(key(x), i as u64);
                }
                m
            },
            |mut m| {
                for x in lcg(7).take(10_000) {
                    let _ = m.erase(key(x).as_str());
                    let _ = m.insert(key(x), x);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_insert_fresh_100k,
    bench_insert_warm_100k,
    bench_find_hit_10k,
    bench_find_miss_10k,
    bench_churn_10k
);
criterion_main!(benches);
