//! Sampling of field values at points
//!
//! [`PointSampleAggregator`] samples fields at caller supplied points once per
//! cycle and combines the results of all processes. [`SideValueSampler`]
//! samples fields at the quadrature points of boundary sides.
mod options;
mod point_sampler;
mod side_sampler;

pub use options::SamplerOptions;
pub use point_sampler::PointSampleAggregator;
pub use side_sampler::{sample_sides, SideValueSampler};
