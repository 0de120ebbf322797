//! A complete indicator pass over a mesh
use crate::indicator::{
    AccumulatedValue, FaceIndicatorAccumulator, IndicatorFinalizer, IndicatorOptions,
};
use crate::threads::run_in_pool;
use crate::traits::{
    AccumulatorStorage, MeshTopology, ProcessReduction, RepresentativeValue, SideIntegrand,
};
use crate::types::{Error, Face, Result};
use log::debug;
use rayon::prelude::*;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The phase an indicator pass is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Faces are being accumulated
    Accumulating,
    /// Contributions have been summed over all processes
    Closed,
    /// Indicators have been finalised
    Finalized,
}

/// Accumulates face contributions in parallel and then finalises every owned region
///
/// Accumulation holds a shared lock on the phase, and finalisation takes it
/// exclusively, so no region is finalised while a face is still being added.
/// Faces are only accepted while accumulating. Once the pass is closed or
/// finalised they are rejected.
pub struct IndicatorPass<'a, M, I, S>
where
    M: MeshTopology + Sync,
    I: SideIntegrand<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    accumulator: FaceIndicatorAccumulator<'a, M, I, S>,
    mesh: &'a M,
    storage: &'a S,
    options: IndicatorOptions,
    phase: RwLock<Phase>,
}

impl<'a, M, I, S> IndicatorPass<'a, M, I, S>
where
    M: MeshTopology + Sync,
    I: SideIntegrand<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    /// Create new
    pub fn new(mesh: &'a M, integrand: &'a I, storage: &'a S, options: IndicatorOptions) -> Self {
        Self {
            accumulator: FaceIndicatorAccumulator::new(mesh, integrand, storage),
            mesh,
            storage,
            options,
            phase: RwLock::new(Phase::Accumulating),
        }
    }

    fn read_phase(&self) -> RwLockReadGuard<'_, Phase> {
        self.phase.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_phase(&self) -> RwLockWriteGuard<'_, Phase> {
        self.phase.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current phase
    pub fn phase(&self) -> Phase {
        *self.read_phase()
    }

    /// The options
    pub fn options(&self) -> &IndicatorOptions {
        &self.options
    }

    /// Add the contribution of one face
    pub fn accumulate(&self, face: &Face<M::T>) -> Result<()> {
        let phase = self.read_phase();
        if *phase != Phase::Accumulating {
            return Err(Error::PhaseViolation);
        }
        self.accumulator.accumulate(face);
        Ok(())
    }

    /// Add the contributions of all faces using the worker threads, returning when every face is done
    pub fn accumulate_all(&self, faces: &[Face<M::T>]) -> Result<()> {
        run_in_pool(self.options.num_threads(), || {
            faces.par_iter().try_for_each(|face| self.accumulate(face))
        })??;
        debug!("Accumulated {} faces", faces.len());
        Ok(())
    }

    /// Sum the storage over all processes
    ///
    /// Contributions added on one process to regions owned by another are
    /// combined. This is collective and must come after all faces are
    /// accumulated and before finalisation. A pass can only be closed once;
    /// if the reduction fails the pass stays open and the storage is unchanged.
    pub fn close(&self, reduction: &impl ProcessReduction) -> Result<()> {
        let mut phase = self.write_phase();
        if *phase != Phase::Accumulating {
            return Err(Error::PhaseViolation);
        }
        let mut values = self.storage.to_vec();
        reduction.sum_reduce(&mut values)?;
        for (i, v) in values.into_iter().enumerate() {
            self.storage.set_at(i, v);
        }
        *phase = Phase::Closed;
        Ok(())
    }

    /// Finalise the indicator of every owned region from the given representative values
    ///
    /// The pass may be open or closed, but not already finalised.
    pub fn finalize_all<V: RepresentativeValue<T = M::T>>(&self, values: &V) -> Result<()> {
        {
            let mut phase = self.write_phase();
            if *phase == Phase::Finalized {
                return Err(Error::PhaseViolation);
            }
            *phase = Phase::Finalized;
        }
        let finalizer = IndicatorFinalizer::new(
            self.mesh,
            values,
            self.storage,
            self.options.scale_by_flux_faces(),
        );
        let regions = self.mesh.owned_regions().collect::<Vec<_>>();
        run_in_pool(self.options.num_threads(), || {
            regions
                .par_iter()
                .for_each(|region| finalizer.finalize(*region))
        })?;
        debug!("Finalised {} indicators", regions.len());
        Ok(())
    }

    /// Finalise every owned region from the value accumulated in its own slot
    pub fn finalize_accumulated(&self) -> Result<()> {
        self.finalize_all(&AccumulatedValue::new(self.mesh, self.storage))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::field::CellwiseLinearField;
    use crate::grid::UniformGrid;
    use crate::indicator::{FieldRepresentative, GradientJumpIntegrand, ValueJumpIntegrand};
    use crate::reduction::{SerialReduction, ThreadGroup};
    use crate::storage::{AtomicVector, StripedVector};
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_field(cell_count: usize, seed: u64) -> CellwiseLinearField<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = CellwiseLinearField::new(1);
        for cell in 0..cell_count {
            field.set(
                cell,
                0,
                rng.gen_range(0.0..1.0),
                [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)],
            );
        }
        field
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = UniformGrid::<f64>::unit_cube(6, 0, 1);
        let field = random_field(grid.cell_count(), 1);
        let integrand = GradientJumpIntegrand::new(&field, 0);
        let faces = grid.interior_faces(2).unwrap();

        let sequential = AtomicVector::<f64>::new(grid.cell_count());
        FaceIndicatorAccumulator::new(&grid, &integrand, &sequential).accumulate_sequential(&faces);

        let parallel = StripedVector::<f64>::new(grid.cell_count(), 8);
        let mut options = IndicatorOptions::default();
        options.set_num_threads(Some(4));
        let pass = IndicatorPass::new(&grid, &integrand, &parallel, options);
        pass.accumulate_all(&faces).unwrap();

        for (s, p) in sequential.to_vec().iter().zip(parallel.to_vec()) {
            assert_relative_eq!(*s, p, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_accumulate_after_finalize() {
        let grid = UniformGrid::<f64>::unit_cube(2, 0, 1);
        let field = random_field(grid.cell_count(), 2);
        let integrand = GradientJumpIntegrand::new(&field, 0);
        let storage = AtomicVector::<f64>::new(grid.cell_count());
        let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
        let faces = grid.interior_faces(1).unwrap();

        pass.accumulate_all(&faces).unwrap();
        pass.finalize_accumulated().unwrap();
        assert_eq!(pass.phase(), Phase::Finalized);
        let finalized = storage.to_vec();

        assert!(matches!(pass.accumulate(&faces[0]), Err(Error::PhaseViolation)));
        assert!(matches!(pass.accumulate_all(&faces), Err(Error::PhaseViolation)));
        assert!(matches!(pass.finalize_accumulated(), Err(Error::PhaseViolation)));
        assert!(matches!(pass.close(&SerialReduction), Err(Error::PhaseViolation)));
        assert_eq!(storage.to_vec(), finalized);
    }

    #[test]
    fn test_close_only_once() {
        let results = ThreadGroup::run(2, |comm| {
            let grid = UniformGrid::<f64>::new([0.0; 3], [2.0, 1.0, 1.0], [2, 1, 1]);
            let mut field = CellwiseLinearField::new(1);
            field.set(1, 0, 1.0, [0.0; 3]);
            let integrand = ValueJumpIntegrand::new(&field, 0);
            let storage = AtomicVector::<f64>::new(2);
            let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
            let faces = grid.interior_faces(1).unwrap();
            if comm.rank() == 0 {
                pass.accumulate_all(&faces).unwrap();
            }
            pass.close(&comm).unwrap();
            assert_eq!(pass.phase(), Phase::Closed);
            let closed = storage.to_vec();

            assert!(matches!(pass.close(&comm), Err(Error::PhaseViolation)));
            assert!(matches!(pass.accumulate(&faces[0]), Err(Error::PhaseViolation)));
            assert!(matches!(pass.accumulate_all(&faces), Err(Error::PhaseViolation)));
            assert_eq!(storage.to_vec(), closed);

            pass.finalize_accumulated().unwrap();
            assert_eq!(pass.phase(), Phase::Finalized);
            (closed, storage.into_vec())
        });
        // Jump of 1 over a unit face, scaled by the cell diagonal
        let h = 3.0f64.sqrt();
        for (closed, finalized) in results {
            assert_relative_eq!(closed[0], h);
            assert_relative_eq!(closed[1], h);
            assert_relative_eq!(finalized[1], h.sqrt());
        }
    }

    #[test]
    fn test_failed_close_leaves_pass_open() {
        let results = ThreadGroup::run(2, |comm| {
            let grid = UniformGrid::<f64>::unit_cube(2, comm.rank(), 2);
            let field = random_field(grid.cell_count(), 4);
            let integrand = GradientJumpIntegrand::new(&field, 0);
            let storage = AtomicVector::<f64>::new(grid.cell_count() + comm.rank());
            let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
            let first = pass.close(&comm);
            (matches!(first, Err(Error::ShapeMismatch { .. })), pass.phase())
        });
        for (mismatch, phase) in results {
            assert!(mismatch);
            assert_eq!(phase, Phase::Accumulating);
        }
    }

    #[test]
    fn test_finalize_from_field() {
        let grid = UniformGrid::<f64>::unit_cube(3, 0, 1);
        let mut field = CellwiseLinearField::new(1);
        field.set_default(0, 36.0, [0.0; 3]);
        let integrand = GradientJumpIntegrand::new(&field, 0);
        let storage = AtomicVector::<f64>::new(grid.cell_count());
        let mut options = IndicatorOptions::default();
        options.set_scale_by_flux_faces(true);
        let pass = IndicatorPass::new(&grid, &integrand, &storage, options);
        pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
        pass.finalize_all(&FieldRepresentative::new(&field, 0)).unwrap();

        // Corner cells have 3 flux faces, the centre cell 6
        assert_relative_eq!(storage.read_at(0), 2.0);
        assert_relative_eq!(storage.read_at(grid.cell_index([1, 1, 1])), 1.0);
    }

    #[test]
    fn test_close_over_ranks_matches_serial() {
        let n = 4;
        let serial = {
            let grid = UniformGrid::<f64>::unit_cube(n, 0, 1);
            let field = random_field(grid.cell_count(), 3);
            let integrand = GradientJumpIntegrand::new(&field, 0);
            let storage = AtomicVector::<f64>::new(grid.cell_count());
            let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
            pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
            pass.finalize_accumulated().unwrap();
            storage.into_vec()
        };

        let results = ThreadGroup::run(3, |comm| {
            let grid = UniformGrid::<f64>::unit_cube(n, comm.rank(), 3);
            let field = random_field(grid.cell_count(), 3);
            let integrand = GradientJumpIntegrand::new(&field, 0);
            let storage = AtomicVector::<f64>::new(grid.cell_count());
            let pass = IndicatorPass::new(&grid, &integrand, &storage, IndicatorOptions::default());
            pass.accumulate_all(&grid.interior_faces(2).unwrap()).unwrap();
            pass.close(&comm).unwrap();
            pass.finalize_accumulated().unwrap();
            (grid.owned_regions().collect::<Vec<_>>(), storage.into_vec())
        });

        for (owned, values) in results {
            for region in owned {
                assert_relative_eq!(values[region], serial[region], max_relative = 1e-12);
            }
        }
    }
}
