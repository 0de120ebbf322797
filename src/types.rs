//! Types specific to meshprobe

use std::cmp::Ordering;
use std::fmt::Debug;

/// A point in physical space
pub type Point<T> = [T; 3];

#[cfg(feature = "mpi")]
/// Real scalar type used for coordinates and field values
pub trait RealScalar:
    num::Float + Debug + Send + Sync + 'static + mpi::traits::Equivalence
{
}
#[cfg(feature = "mpi")]
impl<T: num::Float + Debug + Send + Sync + 'static + mpi::traits::Equivalence> RealScalar for T {}

#[cfg(not(feature = "mpi"))]
/// Real scalar type used for coordinates and field values
pub trait RealScalar: num::Float + Debug + Send + Sync + 'static {}
#[cfg(not(feature = "mpi"))]
impl<T: num::Float + Debug + Send + Sync + 'static> RealScalar for T {}

/// Error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Points and ids were given with different lengths
    #[error("{points} points were given with {ids} ids")]
    LengthMismatch {
        /// Number of points
        points: usize,
        /// Number of ids
        ids: usize,
    },
    /// Processes entered a collective operation with different buffer lengths
    #[error("reduction buffer of length {local} does not match other processes (min {min}, max {max})")]
    ShapeMismatch {
        /// Length of the buffer on this process
        local: usize,
        /// Smallest length over all processes
        min: usize,
        /// Largest length over all processes
        max: usize,
    },
    /// A requested field does not exist
    #[error("field {field} requested but only {count} fields exist")]
    UnknownField {
        /// The requested field
        field: usize,
        /// The number of fields
        count: usize,
    },
    /// An indicator pass operation was called in the wrong phase
    #[error("operation not allowed in the current phase of the indicator pass")]
    PhaseViolation,
    /// No quadrature rule with this number of points
    #[error("no quadrature rule with {0} points")]
    InvalidQuadrature(usize),
    /// Thread pool could not be created
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// A single sampled point
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord<T: RealScalar> {
    /// Caller supplied id of the point
    pub id: T,
    /// Location of the point
    pub point: Point<T>,
    /// Sampled values, one per requested field
    pub values: Vec<T>,
    /// Number of processes that owned the point.
    ///
    /// Zero means the point lies outside the mesh and `values` are all zero.
    pub owners: usize,
}

impl<T: RealScalar> SampleRecord<T> {
    /// Check if any process owned the point
    pub fn is_sampled(&self) -> bool {
        self.owners > 0
    }
}

/// A side of a region, with a quadrature rule mapped onto it
#[derive(Debug, Clone)]
pub struct Face<T: RealScalar> {
    /// The region the face is seen from
    pub element: usize,
    /// The region on the other side, or `None` on the boundary
    pub neighbour: Option<usize>,
    /// Physical quadrature points
    pub points: Vec<Point<T>>,
    /// Quadrature weights multiplied by the Jacobian determinant and the coordinate transformation
    pub weights: Vec<T>,
    /// Unit normals pointing out of `element`, one per quadrature point
    pub normals: Vec<Point<T>>,
}

impl<T: RealScalar> Face<T> {
    /// The number of quadrature points
    pub fn npoints(&self) -> usize {
        self.points.len()
    }

    /// Check if the face is shared with another region
    pub fn is_interior(&self) -> bool {
        self.neighbour.is_some()
    }
}

/// Column used to sort finalised samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortBy {
    /// Sort by point id
    Id,
    /// Sort by x coordinate
    X,
    /// Sort by y coordinate
    Y,
    /// Sort by z coordinate
    Z,
}

impl SortBy {
    /// The key of a record for this column
    pub fn key<T: RealScalar>(&self, record: &SampleRecord<T>) -> T {
        match self {
            SortBy::Id => record.id,
            SortBy::X => record.point[0],
            SortBy::Y => record.point[1],
            SortBy::Z => record.point[2],
        }
    }

    /// Stable sort of records by this column
    ///
    /// Records whose key is NaN are placed last.
    pub fn sort<T: RealScalar>(&self, records: &mut [SampleRecord<T>]) {
        records.sort_by(|a, b| {
            let (ka, kb) = (self.key(a), self.key(b));
            match (ka.is_nan(), kb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => ka.partial_cmp(&kb).unwrap_or(Ordering::Equal),
            }
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(id: f64, x: f64) -> SampleRecord<f64> {
        SampleRecord {
            id,
            point: [x, 0.0, 0.0],
            values: vec![],
            owners: 1,
        }
    }

    #[test]
    fn test_sort_by_id_is_stable() {
        let mut records = vec![record(2.0, 0.0), record(1.0, 1.0), record(2.0, 2.0)];
        SortBy::Id.sort(&mut records);
        assert_eq!(records[0].id, 1.0);
        assert_eq!(records[1].point[0], 0.0);
        assert_eq!(records[2].point[0], 2.0);
    }

    #[test]
    fn test_nan_keys_sorted_last() {
        let mut records = vec![
            record(f64::NAN, 0.0),
            record(3.0, 1.0),
            record(f64::NAN, 2.0),
            record(-1.0, 3.0),
            record(2.0, 4.0),
        ];
        SortBy::Id.sort(&mut records);
        assert_eq!(records[0].id, -1.0);
        assert_eq!(records[1].id, 2.0);
        assert_eq!(records[2].id, 3.0);
        assert!(records[3].id.is_nan());
        assert_eq!(records[3].point[0], 0.0);
        assert_eq!(records[4].point[0], 2.0);
    }

    #[test]
    fn test_sort_by_x() {
        let mut records = vec![record(0.0, 3.0), record(1.0, -1.0)];
        SortBy::X.sort(&mut records);
        assert_eq!(records[0].id, 1.0);
    }
}
