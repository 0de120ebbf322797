//! Indicator integrands
use crate::types::{Point, RealScalar};

pub trait SideIntegrand: Sync {
    //! The quantity integrated over a face shared by two regions

    /// Scalar type
    type T: RealScalar;

    /// Evaluate the integrand at a quadrature point
    ///
    /// `normal` is the unit normal pointing from `element` into `neighbour`.
    fn evaluate(
        &self,
        element: usize,
        neighbour: usize,
        point: &Point<Self::T>,
        normal: &Point<Self::T>,
    ) -> Self::T;
}
