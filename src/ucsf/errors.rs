// csv2ucsf/src/ucsf/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UcsfError {
    #[error("File IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a UCSF file: identifier is {0:?}")]
    InvalidIdent(String),
    #[error("Only 2D spectra are supported, but the file has {0} axes")]
    UnsupportedDimensions(u8),
    #[error("File ends before the {0} is complete")]
    Truncated(&'static str),
    #[error("Data shape {found:?} does not match the axis sizes {expected:?}")]
    ShapeMismatch {
        found: (usize, usize),
        expected: (usize, usize),
    },
    #[error("{field} holds at most {max} bytes, but got {value:?}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        value: String,
    },
    #[error("Invalid tile shape {0} x {1}")]
    InvalidTileShape(usize, usize),
    #[error("Axis with {0} points does not fit in a UCSF header")]
    AxisTooLarge(usize),
}
