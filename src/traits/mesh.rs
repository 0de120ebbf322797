//! Mesh access
use crate::types::{Point, RealScalar};

pub trait SpatialSearch {
    //! Search for the region containing a point
    //!
    //! Only the regions owned by the calling process are searched.

    /// Scalar type
    type T: RealScalar;

    /// Find the owned region containing a point, or `None` if no owned region contains it
    fn find_region_containing(&self, point: &Point<Self::T>) -> Option<usize>;

    /// Check if a region contains a point
    fn contains(&self, region: usize, point: &Point<Self::T>) -> bool;

    /// Token that changes every time the mesh changes
    fn generation(&self) -> u64;
}

pub trait MeshTopology {
    //! Regions of a mesh and their neighbours

    /// Scalar type
    type T: RealScalar;
    /// Iterator over the regions owned by this process
    type RegionIter<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// The number of regions on all processes
    fn region_count(&self) -> usize;

    /// The regions owned by this process
    fn owned_regions(&self) -> Self::RegionIter<'_>;

    /// The number of sides of a region
    fn side_count(&self, region: usize) -> usize;

    /// The region on the other side of a side, or `None` for sides on the boundary
    fn neighbour(&self, region: usize, side: usize) -> Option<usize>;

    /// The characteristic size of a region: the largest distance between two of its vertices
    fn characteristic_size(&self, region: usize) -> Self::T;

    /// Index of the indicator degree of freedom of a region
    fn indicator_dof(&self, region: usize) -> usize {
        region
    }

    /// The number of sides of a region that are shared with another region
    fn flux_face_count(&self, region: usize) -> usize {
        (0..self.side_count(region))
            .filter(|side| self.neighbour(region, *side).is_some())
            .count()
    }
}
