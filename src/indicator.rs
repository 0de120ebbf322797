//! Interior-face error indicators
//!
//! An indicator pass has two phases. While accumulating, every interior face
//! adds `h * sum_qp(JxW * integrand)` into the slot of each of its two regions,
//! where `h` is that region's own characteristic size. Once every face is done,
//! each region's slot is replaced by `sqrt(value) / divisor`.
mod face;
mod finalize;
mod integrands;
mod options;
mod pass;

pub use face::FaceIndicatorAccumulator;
pub use finalize::{AccumulatedValue, FieldRepresentative, IndicatorFinalizer};
pub use integrands::{GradientJumpIntegrand, ValueJumpIntegrand};
pub use options::IndicatorOptions;
pub use pass::{IndicatorPass, Phase};
