// csv2ucsf/src/ucsf/mod.rs

//! Sparky UCSF spectrum files.
//!
//! A file is a 180 byte file header, one 128 byte header per axis, and the
//! intensities as big-endian `f32` stored tile by tile. Only 2D spectra are
//! supported.

mod errors;
mod header;
mod reader;
mod tiles;
mod writer;

pub use errors::UcsfError;
pub use header::{
    AxisHeader, FileHeader, UcsfHeader, AXIS_HEADER_SIZE, FILE_HEADER_SIZE, UCSF_IDENT,
};
pub use reader::{read, read_from};
pub use tiles::{tile_shape, TILE_KBYTE_MAX};
pub use writer::{write, write_to};
