//! Discrete fields
use crate::traits::FieldEvaluator;
use crate::types::{Point, RealScalar};
use std::collections::HashMap;

/// Fields that are linear on each region, `u(p) = c + g . p`
///
/// Each field has a default (c, g) used on every region, which can be
/// overridden region by region. The fields may therefore jump across faces.
/// The representative value of a region is `c`.
#[derive(Debug, Clone)]
pub struct CellwiseLinearField<T: RealScalar> {
    defaults: Vec<(T, Point<T>)>,
    overrides: HashMap<(usize, usize), (T, Point<T>)>,
}

impl<T: RealScalar> CellwiseLinearField<T> {
    /// Create `field_count` fields that are zero everywhere
    pub fn new(field_count: usize) -> Self {
        Self {
            defaults: vec![(T::zero(), [T::zero(); 3]); field_count],
            overrides: HashMap::new(),
        }
    }

    /// Set a field on every region that has no override
    pub fn set_default(&mut self, field: usize, constant: T, gradient: Point<T>) {
        self.defaults[field] = (constant, gradient);
    }

    /// Set a field on one region
    pub fn set(&mut self, region: usize, field: usize, constant: T, gradient: Point<T>) {
        if field >= self.defaults.len() {
            panic!("Field {field} does not exist");
        }
        self.overrides.insert((region, field), (constant, gradient));
    }

    fn coefficients(&self, region: usize, field: usize) -> &(T, Point<T>) {
        self.overrides
            .get(&(region, field))
            .unwrap_or(&self.defaults[field])
    }
}

impl<T: RealScalar> FieldEvaluator for CellwiseLinearField<T> {
    type T = T;

    fn field_count(&self) -> usize {
        self.defaults.len()
    }

    fn value_at(&self, region: usize, point: &Point<T>, field: usize) -> T {
        let (c, g) = self.coefficients(region, field);
        *c + g[0] * point[0] + g[1] * point[1] + g[2] * point[2]
    }

    fn gradient_at(&self, region: usize, _point: &Point<T>, field: usize) -> Point<T> {
        self.coefficients(region, field).1
    }

    fn representative_value(&self, region: usize, field: usize) -> T {
        self.coefficients(region, field).0
    }
}
