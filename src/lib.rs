//! Meshprobe
//!
//! Sampling of field values at arbitrary points of a partitioned mesh and
//! accumulation of interior-face error indicators.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod field;
pub mod grid;
pub mod indicator;
pub mod locator;
pub mod quadrature;
pub mod reduction;
pub mod sampling;
pub mod storage;
pub mod threads;
pub mod traits;
pub mod types;
