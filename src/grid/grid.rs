// csv2ucsf/src/grid/grid.rs

use ndarray::{Array1, Array2};

/// Dense 2D spectrum. Row `r` holds `y_axis[r]`, column `c` holds `x_axis[c]`,
/// and both axes run from the highest chemical shift to the lowest.
#[derive(Clone, Debug)]
pub struct Grid {
    x_axis: Array1<f64>,
    y_axis: Array1<f64>,
    data: Array2<f64>,
    duplicates: usize,
}

impl Grid {
    pub(crate) fn new(
        x_axis: Array1<f64>,
        y_axis: Array1<f64>,
        data: Array2<f64>,
        duplicates: usize,
    ) -> Self {
        Self {
            x_axis,
            y_axis,
            data,
            duplicates,
        }
    }

    pub fn x_axis(&self) -> &Array1<f64> {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Array1<f64> {
        &self.y_axis
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// `(rows, columns)`, i.e. `(|Y|, |X|)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Number of input samples that repeated an already seen `(x, y)` pair.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn to_f32(&self) -> Array2<f32> {
        self.data.mapv(|v| v as f32)
    }
}
