//! Benchmarks for the density-to-GPU mesh pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use isomesh::mesh::DEFAULT_BUCKET_DIM;
use isomesh::prelude::*;

fn bench_field_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_sampling");
    group.sample_size(20);

    for res in [32, 64, 128] {
        group.throughput(Throughput::Elements((res * res * res) as u64));
        group.bench_with_input(BenchmarkId::new("sphere", res), &res, |b, &res| {
            b.iter(|| DensityField::sphere(res, res, res, black_box(0.75)))
        });
    }

    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("marching_tetrahedra");
    group.sample_size(10); // Fewer samples for slow benchmarks

    for res in [16, 32, 64] {
        let field = DensityField::sphere(res, res, res, 0.75).unwrap();
        group.bench_with_input(BenchmarkId::new("resolution", res), &field, |b, field| {
            b.iter(|| create_mesh_from_density_field(0.0, black_box(field), DEFAULT_BUCKET_DIM))
        });
    }

    group.finish();
}

fn bench_normals(c: &mut Criterion) {
    let field = DensityField::sphere(64, 64, 64, 0.75).unwrap();
    let mesh = create_mesh_from_density_field(0.0, &field, DEFAULT_BUCKET_DIM);

    c.bench_function("compute_normals", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            m.compute_normals();
            m
        })
    });
}

fn bench_cache_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_sort");
    group.sample_size(10);

    for res in [16, 32, 64] {
        let field = DensityField::sphere(res, res, res, 0.75).unwrap();
        let config = MeshConfig {
            cache_sort: false,
            ..Default::default()
        };
        let mesh = density_to_mesh(&field, &config);
        group.throughput(Throughput::Elements(mesh.face_count() as u64));

        for lru in [16, 32] {
            group.bench_with_input(
                BenchmarkId::new(format!("lru{lru}"), res),
                &mesh,
                |b, mesh| b.iter(|| black_box(mesh).cache_sort_order(lru)),
            );
        }
    }

    group.finish();
}

fn bench_create_geom(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_geom");

    for res in [32, 64] {
        let field = DensityField::sphere(res, res, res, 0.75).unwrap();
        let mesh = density_to_mesh(&field, &MeshConfig::default());
        group.throughput(Throughput::Elements(mesh.vertex_count() as u64));
        group.bench_with_input(BenchmarkId::new("resolution", res), &mesh, |b, mesh| {
            b.iter(|| black_box(mesh).create_geom())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_field_sampling,
    bench_extraction,
    bench_normals,
    bench_cache_sort,
    bench_create_geom,
);

criterion_main!(benches);
