//! Field evaluation
use crate::types::{Point, RealScalar};

pub trait FieldEvaluator: Sync {
    //! Evaluation of discrete fields
    //!
    //! Fields are identified by their index, from 0 to `field_count() - 1`.

    /// Scalar type
    type T: RealScalar;

    /// The number of fields
    fn field_count(&self) -> usize;

    /// Value of a field at a point in a region
    fn value_at(&self, region: usize, point: &Point<Self::T>, field: usize) -> Self::T;

    /// Gradient of a field at a point in a region
    fn gradient_at(&self, region: usize, point: &Point<Self::T>, field: usize) -> Point<Self::T>;

    /// The single value of a field that is constant on each region
    fn representative_value(&self, region: usize, field: usize) -> Self::T;
}

pub trait RepresentativeValue: Sync {
    //! Source of the value an indicator is finalised from

    /// Scalar type
    type T: RealScalar;

    /// The representative value of a region
    fn value(&self, region: usize) -> Self::T;
}
