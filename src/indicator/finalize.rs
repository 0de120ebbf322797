//! Conversion of accumulated sums into indicators
use crate::traits::{AccumulatorStorage, FieldEvaluator, MeshTopology, RepresentativeValue};
use num::{Float, One};

/// The value accumulated in the storage slot of each region
pub struct AccumulatedValue<'a, M: MeshTopology, S: AccumulatorStorage<T = M::T>> {
    mesh: &'a M,
    storage: &'a S,
}

impl<'a, M: MeshTopology, S: AccumulatorStorage<T = M::T>> AccumulatedValue<'a, M, S> {
    /// Create new
    pub fn new(mesh: &'a M, storage: &'a S) -> Self {
        Self { mesh, storage }
    }
}

impl<M: MeshTopology + Sync, S: AccumulatorStorage<T = M::T>> RepresentativeValue
    for AccumulatedValue<'_, M, S>
{
    type T = M::T;

    fn value(&self, region: usize) -> M::T {
        self.storage.read_at(self.mesh.indicator_dof(region))
    }
}

/// The representative value of a field that is constant on each region
pub struct FieldRepresentative<'a, F: FieldEvaluator> {
    field: &'a F,
    variable: usize,
}

impl<'a, F: FieldEvaluator> FieldRepresentative<'a, F> {
    /// Create new
    pub fn new(field: &'a F, variable: usize) -> Self {
        Self { field, variable }
    }
}

impl<F: FieldEvaluator> RepresentativeValue for FieldRepresentative<'_, F> {
    type T = F::T;

    fn value(&self, region: usize) -> F::T {
        self.field.representative_value(region, self.variable)
    }
}

/// Sets the indicator of a region to `sqrt(value) / divisor`
///
/// The divisor is the number of faces the region shares with other regions
/// if scaling by flux faces is enabled, and 1 otherwise. Regions with no
/// neighbours use a divisor of 1. The representative value must be
/// non-negative; this is not checked.
pub struct IndicatorFinalizer<'a, M, V, S>
where
    M: MeshTopology,
    V: RepresentativeValue<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    mesh: &'a M,
    values: &'a V,
    storage: &'a S,
    scale_by_flux_faces: bool,
}

impl<'a, M, V, S> IndicatorFinalizer<'a, M, V, S>
where
    M: MeshTopology,
    V: RepresentativeValue<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    /// Create new
    pub fn new(mesh: &'a M, values: &'a V, storage: &'a S, scale_by_flux_faces: bool) -> Self {
        Self {
            mesh,
            values,
            storage,
            scale_by_flux_faces,
        }
    }

    /// The divisor used for a region
    pub fn divisor(&self, region: usize) -> usize {
        if self.scale_by_flux_faces {
            std::cmp::max(self.mesh.flux_face_count(region), 1)
        } else {
            1
        }
    }

    /// Store the final indicator of a region
    pub fn finalize(&self, region: usize) {
        let value = self.values.value(region);
        let divisor =
            num::cast::<usize, M::T>(self.divisor(region)).unwrap_or_else(|| <M::T>::one());
        self.storage
            .set_at(self.mesh.indicator_dof(region), value.sqrt() / divisor);
    }
}
