// csv2ucsf/src/ucsf/writer.rs

use super::errors::UcsfError;
use super::header::UcsfHeader;
use super::tiles::tile_origins;
use log::debug;
use ndarray::Array2;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes `data` to `path`, replacing any existing file.
///
/// The file is assembled next to its destination and renamed into place, so
/// a failure part way through never leaves a truncated spectrum behind.
pub fn write(path: &Path, header: &UcsfHeader, data: &Array2<f32>) -> Result<(), UcsfError> {
    check_shape(header, data)?;
    let partial = partial_path(path);
    debug!("Writing {} via {}", path.display(), partial.display());
    let result = File::create(&partial)
        .map_err(UcsfError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_to(&mut writer, header, data)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|_| Ok(fs::rename(&partial, path)?));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

pub fn write_to<W: Write>(
    writer: &mut W,
    header: &UcsfHeader,
    data: &Array2<f32>,
) -> Result<(), UcsfError> {
    check_shape(header, data)?;
    writer.write_all(&header.file.to_bytes()?)?;
    for axis in header.axes.iter() {
        writer.write_all(&axis.to_bytes()?)?;
    }
    let shape = header.shape();
    let (tile_rows, tile_cols) = header.tile();
    for (row0, col0) in tile_origins(shape, (tile_rows, tile_cols)) {
        for row in row0..row0 + tile_rows {
            for col in col0..col0 + tile_cols {
                // Edge tiles are padded with zeros to full size.
                let value = data.get((row, col)).copied().unwrap_or(0.);
                writer.write_all(&value.to_be_bytes())?;
            }
        }
    }
    Ok(())
}

fn check_shape(header: &UcsfHeader, data: &Array2<f32>) -> Result<(), UcsfError> {
    if data.dim() != header.shape() {
        return Err(UcsfError::ShapeMismatch {
            found: data.dim(),
            expected: header.shape(),
        });
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
