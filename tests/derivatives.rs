use meshmaps::combo::ComboMap;
use meshmaps::maps::{
    Background, ExpMap, IdentityMap, InjectActiveCells, LinearMap, ReciprocalMap, Surject2Dto3D,
    SurjectFull, SurjectVertical1D,
};
use meshmaps::mesh::{ActiveCells, TensorMesh};
use meshmaps::operator::LinearOperator;
use meshmaps::parametric::{
    ParametricBlock, ParametricCircleMap, ParametricEllipsoid, ParametricLayer, ParametricPolyMap,
    PolyOrder, ShapeConfig, ValueOrder,
};
use meshmaps::traits::{Mapping, Mesh};
use meshmaps::types::{Axis, Error};
use meshmaps::verify::{check_adjoint, check_derivative, check_map_derivative, DerivativeCheckOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rlst::RawAccessMut;
use std::sync::Arc;

fn stage<M: Mapping + 'static>(map: M) -> Arc<dyn Mapping> {
    Arc::new(map)
}

fn shape_config(slope: f64) -> ShapeConfig {
    let mut config = ShapeConfig::default();
    config.set_slope(slope);
    config
}

/// Check the Taylor convergence and the adjoint of `map` at `x0`
fn check_map(map: &dyn Mapping, x0: &[f64]) {
    for seed in 0..3 {
        let mut options = DerivativeCheckOptions::default();
        options.set_seed(seed);
        let report = check_map_derivative(map, x0, &options)
            .unwrap_or_else(|e| panic!("{} failed the derivative check: {e}", map.name()));
        assert!(report.passed());
    }
    let jacobian = map.derivative(x0).unwrap();
    assert_eq!(jacobian.shape(), [map.n_out(), map.n_params()]);
    let mut rng = StdRng::seed_from_u64(1);
    assert!(check_adjoint(&jacobian, &mut rng).unwrap() < 1e-12);
}

#[test]
fn test_primitive_maps() {
    let mesh = TensorMesh::uniform(&[4, 3, 5], 1.0).unwrap();
    check_map(&IdentityMap::new(4), &[1.0, -2.0, 0.5, 3.0]);
    check_map(&ExpMap::new(3), &[0.3, -1.0, 2.0]);
    check_map(&ReciprocalMap::new(3), &[1.5, -2.0, 0.75]);
    check_map(
        &LinearMap::from_rows(&[vec![1.0, 2.0, -1.0], vec![0.0, 0.5, 4.0]])
            .unwrap()
            .with_offset(vec![3.0, -1.0])
            .unwrap(),
        &[0.2, 0.4, -0.6],
    );
    check_map(&SurjectFull::new(&mesh).unwrap(), &[2.5]);
    check_map(&SurjectVertical1D::new(&mesh).unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    check_map(
        &Surject2Dto3D::new(&mesh, Axis::Y).unwrap(),
        &(0..20).map(|v| v as f64).collect::<Vec<_>>(),
    );
    let active = ActiveCells::from_predicate(&mesh, |x| x[2] < 3.0).unwrap();
    check_map(
        &InjectActiveCells::new(active, Background::Constant(1e-8)).unwrap(),
        &vec![0.5; 36],
    );
}

#[test]
fn test_shape_maps() {
    let mesh_2d = TensorMesh::uniform(&[20, 20], 0.5).unwrap();
    let mesh_3d = TensorMesh::uniform(&[8, 8, 8], 1.0).unwrap();

    check_map(
        &ParametricCircleMap::new(&mesh_2d, shape_config(2.0)).unwrap(),
        &[1.0, 3.0, 5.0, 5.0, 2.5],
    );
    check_map(
        &ParametricEllipsoid::new(&mesh_2d, shape_config(2.0)).unwrap(),
        &[1.0, 3.0, 5.0, 3.0, 4.0, 2.0],
    );
    check_map(
        &ParametricEllipsoid::new(&mesh_3d, shape_config(2.0)).unwrap(),
        &[1.0, 2.0, 4.0, 2.5, 4.0, 3.0, 4.0, 2.0],
    );
    check_map(
        &ParametricBlock::new(&mesh_2d, shape_config(3.0)).unwrap(),
        &[5.0, 10.0, 5.0, 2.0, 5.0, 1.0],
    );
    check_map(
        &ParametricBlock::new(&mesh_3d, shape_config(2.0)).unwrap(),
        &[5.0, 10.0, 4.0, 2.0, 4.0, 1.5, 3.0, 1.0],
    );
    check_map(
        &ParametricLayer::new(&mesh_3d, shape_config(2.0)).unwrap(),
        &[1.0, 2.0, 5.0, 2.0],
    );

    // Unit-sized meshes keep the polynomial terms of the same scale
    let unit_2d = TensorMesh::uniform(&[10, 10], 0.1).unwrap();
    let unit_3d = TensorMesh::uniform(&[6, 6, 6], 0.2).unwrap();
    check_map(
        &ParametricPolyMap::new(&unit_2d, PolyOrder::Single(2), Axis::Y, shape_config(5.0))
            .unwrap(),
        &[1.0, 2.0, 0.5, 0.2, -0.1],
    );
    check_map(
        &ParametricPolyMap::new(&unit_3d, PolyOrder::Pair(1, 2), Axis::X, shape_config(4.0))
            .unwrap(),
        &[1.0, 2.0, 0.6, 0.1, -0.2, 0.05, 0.1, -0.1],
    );
}

#[test]
fn test_shape_map_options() {
    let mesh = TensorMesh::uniform(&[10, 10, 6], 0.2).unwrap();
    let active = ActiveCells::from_predicate(&mesh, |x| x[2] < 0.8).unwrap();
    let mut config = shape_config(4.0);
    config.set_log_values(true);
    config.set_value_order(ValueOrder::ForegroundFirst);
    config.set_active_cells(active);
    let map = ParametricPolyMap::new(&mesh, PolyOrder::Single(1), Axis::Z, config).unwrap();
    assert_eq!(map.n_out(), 400);
    check_map(&map, &[0.5_f64.ln(), 0.01_f64.ln(), 0.4, 0.1, 0.05, -0.02]);
}

#[test]
fn test_compositions() {
    let mesh = TensorMesh::uniform(&[8, 8, 6], 1.0).unwrap();
    let active = ActiveCells::from_predicate(&mesh, |x| x[2] < 4.0).unwrap();
    let mut config = shape_config(2.0);
    config.set_active_cells(active.clone());
    let shape = ParametricEllipsoid::new(&mesh, config).unwrap();
    let combo = ComboMap::new(vec![
        stage(shape),
        stage(ExpMap::new(active.n_active())),
        stage(InjectActiveCells::new(active, Background::Constant(1e-8)).unwrap()),
    ])
    .unwrap();
    check_map(&combo, &[-1.0, 0.5, 4.0, 2.0, 4.0, 3.0, 2.0, 1.5]);

    let mesh_2d = TensorMesh::uniform(&[8, 6], 1.0).unwrap();
    let layered = ComboMap::new(vec![
        stage(ExpMap::new(6)),
        stage(SurjectVertical1D::new(&mesh_2d).unwrap()),
        stage(Surject2Dto3D::new(&mesh, Axis::Y).unwrap()),
        stage(ReciprocalMap::new(mesh.n_cells())),
    ])
    .unwrap();
    check_map(&layered, &[0.1, -0.4, 0.3, 1.0, -1.0, 0.0]);
}

#[test]
fn test_check_derivative_closure() {
    let map = ParametricCircleMap::new(
        &TensorMesh::uniform(&[12, 12], 1.0).unwrap(),
        shape_config(1.5),
    )
    .unwrap();
    let report = check_derivative(
        |x| Ok((map.forward(x)?, map.derivative(x)?)),
        &[2.0, 4.0, 6.0, 6.0, 3.0],
        &DerivativeCheckOptions::default(),
    )
    .unwrap();
    assert!(report.mean_order().unwrap() > 1.5);

    // A Jacobian without its geometric columns converges at first order only
    let wrong = |x: &[f64]| {
        let value = map.forward(x)?;
        let mut jacobian = map.derivative(x)?.to_dense()?;
        let n = map.n_out();
        jacobian.data_mut()[2 * n..].iter_mut().for_each(|v| *v = 0.0);
        Ok::<_, Error>((value, LinearOperator::dense(jacobian)))
    };
    assert!(matches!(
        check_derivative(wrong, &[2.0, 4.0, 6.0, 6.0, 3.0], &DerivativeCheckOptions::default()),
        Err(Error::DerivativeMismatch { .. })
    ));
}
