//! Accumulation of face contributions
use crate::traits::{AccumulatorStorage, MeshTopology, SideIntegrand};
use crate::types::Face;
use itertools::izip;
use num::Zero;

/// Adds the contribution of interior faces to the indicators of both adjoining regions
///
/// Many threads may call [`FaceIndicatorAccumulator::accumulate`] at once, on
/// faces that share regions. The integral is computed without holding any
/// lock; only the two additions go through the storage.
pub struct FaceIndicatorAccumulator<'a, M, I, S>
where
    M: MeshTopology,
    I: SideIntegrand<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    mesh: &'a M,
    integrand: &'a I,
    storage: &'a S,
}

impl<'a, M, I, S> FaceIndicatorAccumulator<'a, M, I, S>
where
    M: MeshTopology,
    I: SideIntegrand<T = M::T>,
    S: AccumulatorStorage<T = M::T>,
{
    /// Create new
    pub fn new(mesh: &'a M, integrand: &'a I, storage: &'a S) -> Self {
        Self {
            mesh,
            integrand,
            storage,
        }
    }

    /// The integral of the integrand over a face, `sum_qp(JxW * integrand)`
    ///
    /// Boundary faces have no neighbour and contribute zero.
    pub fn face_integral(&self, face: &Face<M::T>) -> M::T {
        let Some(neighbour) = face.neighbour else {
            return <M::T>::zero();
        };
        izip!(&face.weights, &face.points, &face.normals)
            .map(|(w, p, n)| *w * self.integrand.evaluate(face.element, neighbour, p, n))
            .fold(<M::T>::zero(), |a, b| a + b)
    }

    /// Add the contribution of a face to both adjoining regions
    ///
    /// Each region receives the face integral scaled by its own characteristic size.
    pub fn accumulate(&self, face: &Face<M::T>) {
        let Some(neighbour) = face.neighbour else {
            return;
        };
        let sum = self.face_integral(face);
        self.add_contribution(face.element, neighbour, sum);
    }

    /// Add an already computed face integral to both adjoining regions
    pub fn add_contribution(&self, element: usize, neighbour: usize, sum: M::T) {
        self.add_scaled(element, sum);
        self.add_scaled(neighbour, sum);
    }

    /// Add the contributions of `faces` one at a time on the calling thread
    pub fn accumulate_sequential(&self, faces: &[Face<M::T>]) {
        for face in faces {
            self.accumulate(face);
        }
    }

    fn add_scaled(&self, region: usize, sum: M::T) {
        let h = self.mesh.characteristic_size(region);
        self.storage.add_at(self.mesh.indicator_dof(region), sum * h);
    }
}
