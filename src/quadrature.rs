//! Quadrature rules for face integrals

pub mod gauss_rules;
pub mod types;

pub use gauss_rules::gauss_rule;
pub use types::NumericalQuadratureDefinition;
