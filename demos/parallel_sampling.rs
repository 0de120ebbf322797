//? mpirun -n {{NPROCESSES}} --features "mpi"

#[cfg(feature = "mpi")]
fn parallel_sampling() {
    use approx::assert_relative_eq;
    use meshprobe::field::CellwiseLinearField;
    use meshprobe::grid::UniformGrid;
    use meshprobe::indicator::{GradientJumpIntegrand, IndicatorOptions, IndicatorPass};
    use meshprobe::reduction::CommunicatorReduction;
    use meshprobe::sampling::{PointSampleAggregator, SamplerOptions};
    use meshprobe::storage::AtomicVector;
    use meshprobe::traits::{AccumulatorStorage, MeshTopology};
    use mpi::{environment::Universe, traits::Communicator};

    // Setup an MPI environment
    let universe: Universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank() as usize;
    let size = world.size() as usize;
    let reduction = CommunicatorReduction::new(&world);

    let grid = UniformGrid::<f64>::unit_cube(6, rank, size);
    let mut field = CellwiseLinearField::new(2);
    field.set_default(0, 1.0, [1.0, 2.0, 3.0]);
    field.set_default(1, -1.0, [0.0, 0.0, 0.5]);

    // Sample along the diagonal of the cube, and at one point outside it
    let mut points = (0..11)
        .map(|i| {
            let t = i as f64 / 10.0;
            [t, t, t]
        })
        .collect::<Vec<_>>();
    points.push([2.0, 0.0, 0.0]);
    let ids = (0..points.len()).map(|i| i as f64).collect::<Vec<_>>();

    let mut options = SamplerOptions::default();
    options.set_locator_count(4);
    let mut sampler = PointSampleAggregator::new(&grid, &field, &reduction, options).unwrap();
    for _ in 0..3 {
        let records = sampler.evaluate(&points, &ids).unwrap();
        for record in &records[..11] {
            let t = record.point[0];
            assert_eq!(record.owners, 1);
            assert_relative_eq!(record.values[0], 1.0 + 6.0 * t, epsilon = 1e-12);
            assert_relative_eq!(record.values[1], -1.0 + 0.5 * t, epsilon = 1e-12);
        }
        assert!(!records[11].is_sampled());
    }
    if rank == 0 {
        println!("Sampled {} points on {size} processes", points.len());
    }

    // Indicator of a field with a kink between the two halves of the cube
    for cell in 0..grid.cell_count() {
        if grid.midpoint(cell)[0] > 0.5 {
            field.set(cell, 0, 1.0, [-1.0, 2.0, 3.0]);
        }
    }
    let integrand = GradientJumpIntegrand::new(&field, 0);
    let storage = AtomicVector::<f64>::new(grid.region_count());
    let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
    pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
    pass.close(&reduction).unwrap();
    pass.finalize_accumulated().unwrap();

    let flagged = grid
        .owned_regions()
        .filter(|cell| storage.read_at(*cell) > 0.0)
        .count();
    println!("Rank {rank}: {flagged} cells have a nonzero indicator");
}

#[cfg(not(feature = "mpi"))]
fn parallel_sampling() {}

fn main() {
    parallel_sampling()
}
