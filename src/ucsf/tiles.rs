// csv2ucsf/src/ucsf/tiles.rs

/// Upper bound on the size of one tile, in KiB of `f32` data.
pub const TILE_KBYTE_MAX: usize = 128;

/// Halves the axes in turn, starting with the first, until a tile fits in
/// `kbyte_max` KiB. Sparky expects exactly this shape for a given data size.
pub fn tile_shape(shape: (usize, usize), kbyte_max: usize) -> (usize, usize) {
    let mut tile = [shape.0.max(1), shape.1.max(1)];
    let mut axis = 0;
    while (tile[0] * tile[1] * 4) as f64 / 1024. > kbyte_max as f64 {
        tile[axis] = (tile[axis] / 2).max(1);
        axis = (axis + 1) % 2;
    }
    (tile[0], tile[1])
}

/// Number of tiles along each axis, counting partial tiles at the edges.
pub(crate) fn tile_counts(shape: (usize, usize), tile: (usize, usize)) -> (usize, usize) {
    (shape.0.div_ceil(tile.0), shape.1.div_ceil(tile.1))
}

/// Tile origins in the order they are stored: row-major over the tile grid.
pub(crate) fn tile_origins(
    shape: (usize, usize),
    tile: (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    let (rows, cols) = tile_counts(shape, tile);
    (0..rows).flat_map(move |ty| (0..cols).map(move |tx| (ty * tile.0, tx * tile.1)))
}
