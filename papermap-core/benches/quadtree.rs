use criterion::{black_box, criterion_group, criterion_main, Criterion};
use papermap_core::{Marker, Quadtree};

/// Deterministic scatter over a 1M x 1M world.
fn generate_markers(count: usize) -> Vec<Marker> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    (0..count)
        .map(|i| {
            let x = (next() % 1_000_000) as i64;
            let y = (next() % 1_000_000) as i64;
            let r = (next() % 400) as u32;
            Marker::new(i as u64 + 1, x, y, r)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let markers = generate_markers(100_000);

    c.bench_function("quadtree_build_100k", |b| {
        b.iter(|| {
            let tree = Quadtree::build(black_box(&markers));
            black_box(tree.node_count())
        })
    });
}

fn bench_query(c: &mut Criterion) {
    let markers = generate_markers(100_000);
    let tree = Quadtree::build(&markers);

    c.bench_function("quadtree_query_tile_100k", |b| {
        b.iter(|| {
            let mut count = 0usize;
            tree.apply_if_within(black_box((500_000, 500_000)), black_box((4_000, 4_000)), |_| count += 1);
            black_box(count)
        })
    });

    c.bench_function("quadtree_query_full_100k", |b| {
        b.iter(|| {
            let mut count = 0usize;
            tree.apply_if_within((500_000, 500_000), (500_000, 500_000), |_| count += 1);
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
