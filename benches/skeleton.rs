//! Benchmarks for skeleton construction and homology over a deep layered
//! chain.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use manifold3::Triangulation;

fn bench_skeleton(c: &mut Criterion) {
    c.bench_function("skeleton_lens_89_34", |b| {
        b.iter(|| {
            let mut tri = Triangulation::new();
            tri.insert_layered_lens_space(89, 34).unwrap();
            black_box(tri.num_edges())
        })
    });
}

fn bench_homology(c: &mut Criterion) {
    c.bench_function("homology_lens_89_34", |b| {
        b.iter(|| {
            let mut tri = Triangulation::new();
            tri.insert_layered_lens_space(89, 34).unwrap();
            black_box(tri.homology_h1().invariant_factors().to_vec())
        })
    });
}

fn bench_barycentric(c: &mut Criterion) {
    c.bench_function("barycentric_lens_8_3", |b| {
        b.iter(|| {
            let mut tri = Triangulation::new();
            tri.insert_layered_lens_space(8, 3).unwrap();
            tri.barycentric_subdivision();
            black_box(tri.num_tetrahedra())
        })
    });
}

criterion_group!(benches, bench_skeleton, bench_homology, bench_barycentric);
criterion_main!(benches);
