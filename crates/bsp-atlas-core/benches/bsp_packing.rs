use std::hint::black_box;

use bsp_atlas_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_textures(count: usize, min_size: u32, max_size: u32) -> Vec<(String, u32, u32)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            (format!("tex_{}", i), w, h)
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_layout");

    for count in [50, 200, 1000] {
        let textures = generate_textures(count, 8, 128);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("pack_layout", count), &textures, |b, textures| {
            b.iter(|| {
                let atlas = pack_layout(textures.clone(), AtlasConfig::default()).expect("pack");
                black_box(atlas)
            });
        });
    }
    group.finish();
}

fn bench_single_tree(c: &mut Criterion) {
    let textures = generate_textures(500, 4, 64);
    let sizes: Vec<Size> = textures.iter().map(|(_, w, h)| Size { w: *w, h: *h }).collect();
    let side = estimate_canvas_size(&sizes);

    c.bench_function("bsp_single_tree_500", |b| {
        b.iter(|| {
            let mut root: AtlasNode<Size> = AtlasNode::root(side, PADDING);
            let mut deferred = 0;
            for s in &sizes {
                if root.insert(*s).is_err() {
                    deferred += 1;
                }
            }
            black_box((root.occupied_area(), deferred))
        });
    });
}

criterion_group!(benches, bench_layout, bench_single_tree);
criterion_main!(benches);
