// csv2ucsf/src/grid/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridBuilderError {
    #[error("Unitialized field on GridBuilder: {0}")]
    UninitializedFieldError(String),
    #[error("precision must be in [0, {max}] decimal places, but got {found}")]
    InvalidPrecision { found: u32, max: u32 },
    #[error("Sample columns differ in length: x={0}, y={1}, z={2}")]
    LengthMismatch(usize, usize, usize),
    #[error("Cannot build a grid from zero samples")]
    EmptySamples,
    #[error(
        "Input is not a complete rectangular grid: {missing} of {expected} points are missing \
         (first missing point: x={x} ppm, y={y} ppm)"
    )]
    IncompleteGrid {
        missing: usize,
        expected: usize,
        x: f64,
        y: f64,
    },
    #[error(
        "Coordinate {value} ppm cannot be matched to {precision} decimal places; \
         use a lower precision"
    )]
    CoordinateOutOfRange { value: f64, precision: u32 },
    #[error("Duplicate sample at x={x} ppm, y={y} ppm")]
    DuplicateSample { x: f64, y: f64 },
}
