//! Type definitions.

/// Definition of a numerical quadrature rule.
#[derive(Debug, Clone)]
pub struct NumericalQuadratureDefinition {
    /// The dimension d of a single point.
    pub dim: usize,

    /// The polynomial degree integrated exactly.
    pub order: usize,

    /// The number of points of the quadrature rule.
    pub npoints: usize,

    /// The weights of the quadrature rule.
    pub weights: Vec<f64>,
    /// The point coordinates of the quadrature rule.
    ///
    /// The vector points stores all points in consecutive order.
    /// Hence, the first point starts at position zero, the second point at
    /// position d, and the third point at position 2d.
    pub points: Vec<f64>,
}

impl NumericalQuadratureDefinition {
    /// The coordinates of point `index`
    pub fn point(&self, index: usize) -> &[f64] {
        &self.points[self.dim * index..self.dim * (index + 1)]
    }
}
