// csv2ucsf/src/grid/mod.rs

mod errors;
mod grid;
mod grid_builder;

pub use errors::GridBuilderError;
pub use grid::Grid;
pub use grid_builder::{DuplicatePolicy, GridBuilder, DEFAULT_PRECISION, MAX_PRECISION};
