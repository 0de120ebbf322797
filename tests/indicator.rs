use approx::assert_relative_eq;
use meshprobe::field::CellwiseLinearField;
use meshprobe::grid::UniformGrid;
use meshprobe::indicator::{
    FaceIndicatorAccumulator, FieldRepresentative, GradientJumpIntegrand, IndicatorOptions,
    IndicatorPass, Phase, ValueJumpIntegrand,
};
use meshprobe::reduction::{SerialReduction, ThreadGroup};
use meshprobe::storage::{AtomicVector, StripedVector};
use meshprobe::traits::{AccumulatorStorage, MeshTopology, ProcessReduction};
use meshprobe::types::Error;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// A field whose value jumps by one across every face normal to x
fn layered_field(grid: &UniformGrid<f64>) -> CellwiseLinearField<f64> {
    let mut f = CellwiseLinearField::new(1);
    for cell in 0..grid.cell_count() {
        let [i, _, _] = grid.cell_position(cell);
        f.set(cell, 0, i as f64, [0.0; 3]);
    }
    f
}

#[test]
fn test_value_jump_indicator() {
    let grid = UniformGrid::<f64>::unit_cube(4, 0, 1);
    let field = layered_field(&grid);
    let integrand = ValueJumpIntegrand::new(&field, 0);
    let storage = AtomicVector::<f64>::new(grid.region_count());
    let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
    pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();

    // Each x face has area 1/16 and the jump squared is 1
    let h = grid.characteristic_size(0);
    let face = h / 16.0;
    for cell in 0..grid.cell_count() {
        let [i, _, _] = grid.cell_position(cell);
        let xfaces = if i == 0 || i == 3 { 1.0 } else { 2.0 };
        assert_relative_eq!(storage.read_at(cell), xfaces * face, max_relative = 1e-12);
    }

    pass.finalize_accumulated().unwrap();
    assert_eq!(pass.phase(), Phase::Finalized);
    let corner = storage.read_at(0);
    assert_relative_eq!(corner, face.sqrt(), max_relative = 1e-12);
}

#[test]
fn test_face_order_does_not_matter() {
    let grid = UniformGrid::<f64>::unit_cube(5, 0, 1);
    let field = layered_field(&grid);
    let integrand = ValueJumpIntegrand::new(&field, 0);
    let mut faces = grid.interior_faces(3).unwrap();

    let first = AtomicVector::<f64>::new(grid.region_count());
    FaceIndicatorAccumulator::new(&grid, &integrand, &first).accumulate_sequential(&faces);

    faces.shuffle(&mut StdRng::seed_from_u64(5));
    let second = StripedVector::<f64>::new(grid.region_count(), 16);
    let mut options = IndicatorOptions::default();
    options.set_num_threads(Some(4));
    IndicatorPass::new(&grid, &integrand, &second, options)
        .accumulate_all(&faces)
        .unwrap();

    for (a, b) in first.into_vec().into_iter().zip(second.into_vec()) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
}

#[test]
fn test_scaled_by_flux_faces() {
    let grid = UniformGrid::<f64>::unit_cube(3, 0, 1);
    let mut field = CellwiseLinearField::new(1);
    field.set_default(0, 16.0, [0.0; 3]);
    let integrand = GradientJumpIntegrand::new(&field, 0);
    let storage = AtomicVector::<f64>::new(grid.region_count());
    let mut options = IndicatorOptions::default();
    options.set_scale_by_flux_faces(true);
    let pass = IndicatorPass::new(&grid, &integrand, &storage, options);
    pass.accumulate_all(&grid.interior_faces(1).unwrap()).unwrap();
    pass.finalize_all(&FieldRepresentative::new(&field, 0)).unwrap();

    // The middle of an edge has 4 flux faces
    assert_relative_eq!(storage.read_at(grid.cell_index([1, 0, 0])), 1.0);
    assert_relative_eq!(storage.read_at(grid.cell_index([1, 1, 0])), 0.8);
    assert_relative_eq!(storage.read_at(grid.cell_index([0, 0, 0])), 4.0 / 3.0);
}

#[test]
fn test_no_faces_after_finalize() {
    let grid = UniformGrid::<f64>::unit_cube(2, 0, 1);
    let field = layered_field(&grid);
    let integrand = ValueJumpIntegrand::new(&field, 0);
    let storage = AtomicVector::<f64>::new(grid.region_count());
    let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
    let faces = grid.interior_faces(1).unwrap();
    pass.close(&SerialReduction).unwrap();
    pass.finalize_accumulated().unwrap();
    assert!(matches!(
        pass.accumulate_all(&faces),
        Err(Error::PhaseViolation)
    ));
    assert!(storage.to_vec().iter().all(|v| *v == 0.0));
}

#[test]
fn test_partitioned_pass() {
    let n = 4;
    let serial = {
        let grid = UniformGrid::<f64>::unit_cube(n, 0, 1);
        let field = layered_field(&grid);
        let integrand = ValueJumpIntegrand::new(&field, 0);
        let storage = AtomicVector::<f64>::new(grid.region_count());
        let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
        pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
        pass.finalize_accumulated().unwrap();
        storage.into_vec()
    };

    let gathered = ThreadGroup::run(4, |comm| {
        let grid = UniformGrid::<f64>::unit_cube(n, comm.rank(), comm.size());
        let field = layered_field(&grid);
        let integrand = ValueJumpIntegrand::new(&field, 0);
        let storage = StripedVector::<f64>::new(grid.region_count(), 4);
        let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
        pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
        pass.close(&comm).unwrap();
        pass.finalize_accumulated().unwrap();
        let values = storage.into_vec();
        let owned = grid
            .owned_regions()
            .map(|region| values[region])
            .collect::<Vec<_>>();
        comm.all_gather(&owned)
    });

    for values in gathered {
        for (a, b) in values.iter().zip(&serial) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }
}
