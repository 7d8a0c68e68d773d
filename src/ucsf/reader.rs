// csv2ucsf/src/ucsf/reader.rs

use super::errors::UcsfError;
use super::header::{
    AxisHeader, FileHeader, UcsfHeader, AXIS_HEADER_SIZE, FILE_HEADER_SIZE, UCSF_IDENT,
};
use super::tiles::tile_origins;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

pub fn read(path: &Path) -> Result<(UcsfHeader, Array2<f32>), UcsfError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_from(&mut reader)
}

pub fn read_from<R: Read>(reader: &mut R) -> Result<(UcsfHeader, Array2<f32>), UcsfError> {
    let mut buf = [0u8; FILE_HEADER_SIZE];
    read_block(reader, &mut buf, "file header")?;
    let file = FileHeader::from_bytes(&buf);
    if file.ident != UCSF_IDENT {
        return Err(UcsfError::InvalidIdent(file.ident));
    }
    if file.naxis != 2 {
        return Err(UcsfError::UnsupportedDimensions(file.naxis));
    }

    let mut axis_buf = [0u8; AXIS_HEADER_SIZE];
    read_block(reader, &mut axis_buf, "axis header")?;
    let rows_axis = AxisHeader::from_bytes(&axis_buf);
    read_block(reader, &mut axis_buf, "axis header")?;
    let cols_axis = AxisHeader::from_bytes(&axis_buf);
    let header = UcsfHeader {
        file,
        axes: [rows_axis, cols_axis],
    };

    let shape = header.shape();
    let (tile_rows, tile_cols) = header.tile();
    if tile_rows == 0 || tile_cols == 0 {
        return Err(UcsfError::InvalidTileShape(tile_rows, tile_cols));
    }
    let mut data = Array2::<f32>::zeros(shape);
    let mut tile = vec![0u8; tile_rows * tile_cols * 4];
    for (row0, col0) in tile_origins(shape, (tile_rows, tile_cols)) {
        read_block(reader, &mut tile, "data")?;
        let mut values = tile
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]));
        for row in row0..row0 + tile_rows {
            for col in col0..col0 + tile_cols {
                let value = values.next().unwrap_or(0.);
                if let Some(cell) = data.get_mut((row, col)) {
                    *cell = value;
                }
            }
        }
    }
    Ok((header, data))
}

fn read_block<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), UcsfError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => UcsfError::Truncated(what),
        _ => UcsfError::Io(e),
    })
}
