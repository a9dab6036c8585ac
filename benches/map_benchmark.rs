use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshmaps::maps::{Background, ExpMap, InjectActiveCells};
use meshmaps::mesh::{ActiveCells, TensorMesh};
use meshmaps::parametric::{ParametricEllipsoid, ShapeConfig};
use meshmaps::traits::{Mapping, MappingExt};

pub fn shape_map_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape maps");
    group.sample_size(20);

    for n in [16, 32] {
        let mesh = TensorMesh::uniform(&[n, n, n], 1.0).unwrap();
        let active = ActiveCells::from_predicate(&mesh, |x| x[2] < 0.75 * n as f64).unwrap();
        let mut config = ShapeConfig::default();
        config.set_slope(5.0);
        config.set_log_values(true);
        config.set_active_cells(active.clone());
        let shape = ParametricEllipsoid::new(&mesh, config).unwrap();
        let map = shape
            .then(InjectActiveCells::new(active, Background::Constant(1e-8)).unwrap())
            .unwrap();
        let c0 = 0.5 * n as f64;
        let params = vec![-2.0, 0.0, c0, 0.25 * c0, c0, 0.5 * c0, c0, 0.3 * c0];

        group.bench_function(format!("Forward of an ellipsoid on {n}^3 cells"), |b| {
            b.iter(|| black_box(map.forward(&params).unwrap()))
        });
        group.bench_function(format!("Derivative of an ellipsoid on {n}^3 cells"), |b| {
            b.iter(|| black_box(map.derivative(&params).unwrap()))
        });
    }
    group.finish();
}

pub fn batch_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    let map = ExpMap::new(10000);
    let batch = (0..32)
        .map(|i| vec![1e-3 * i as f64; 10000])
        .collect::<Vec<_>>();
    group.bench_function("Serial forward of 32 models", |b| {
        b.iter(|| {
            black_box(
                batch
                    .iter()
                    .map(|p| map.forward(p))
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap(),
            )
        })
    });
    group.bench_function("Batched forward of 32 models", |b| {
        b.iter(|| black_box(map.forward_batch(&batch).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, shape_map_benchmark, batch_benchmark);
criterion_main!(benches);
