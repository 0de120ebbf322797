//! Trait definitions

mod field;
mod indicator;
mod mesh;
mod reduction;
mod storage;

pub use field::{FieldEvaluator, RepresentativeValue};
pub use indicator::SideIntegrand;
pub use mesh::{MeshTopology, SpatialSearch};
pub use reduction::ProcessReduction;
pub use storage::AccumulatorStorage;
