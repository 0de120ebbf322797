//! Grid creation and storage

pub mod uniform_grid;

pub use uniform_grid::UniformGrid;
