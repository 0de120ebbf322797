//! Integrands
use crate::traits::{FieldEvaluator, SideIntegrand};
use crate::types::Point;
use num::Zero;

/// Square of the jump in the normal derivative of a field, `((grad u_e - grad u_n) . n)^2`
pub struct GradientJumpIntegrand<'a, F: FieldEvaluator> {
    field: &'a F,
    variable: usize,
}

impl<'a, F: FieldEvaluator> GradientJumpIntegrand<'a, F> {
    /// Create new
    pub fn new(field: &'a F, variable: usize) -> Self {
        Self { field, variable }
    }
}

impl<F: FieldEvaluator> SideIntegrand for GradientJumpIntegrand<'_, F> {
    type T = F::T;

    fn evaluate(
        &self,
        element: usize,
        neighbour: usize,
        point: &Point<F::T>,
        normal: &Point<F::T>,
    ) -> F::T {
        let g_element = self.field.gradient_at(element, point, self.variable);
        let g_neighbour = self.field.gradient_at(neighbour, point, self.variable);
        let jump = (0..3)
            .map(|d| (g_element[d] - g_neighbour[d]) * normal[d])
            .fold(<F::T>::zero(), |a, b| a + b);
        jump * jump
    }
}

/// Square of the jump in the value of a field, `(u_e - u_n)^2`
pub struct ValueJumpIntegrand<'a, F: FieldEvaluator> {
    field: &'a F,
    variable: usize,
}

impl<'a, F: FieldEvaluator> ValueJumpIntegrand<'a, F> {
    /// Create new
    pub fn new(field: &'a F, variable: usize) -> Self {
        Self { field, variable }
    }
}

impl<F: FieldEvaluator> SideIntegrand for ValueJumpIntegrand<'_, F> {
    type T = F::T;

    fn evaluate(
        &self,
        element: usize,
        neighbour: usize,
        point: &Point<F::T>,
        _normal: &Point<F::T>,
    ) -> F::T {
        let jump = self.field.value_at(element, point, self.variable)
            - self.field.value_at(neighbour, point, self.variable);
        jump * jump
    }
}
