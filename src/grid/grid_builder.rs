// csv2ucsf/src/grid/grid_builder.rs

use super::errors::GridBuilderError;
use super::grid::Grid;
use crate::loader::Samples;
use humantime::format_duration;
use log::{debug, info, warn};
use ndarray::{Array1, Array2};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

/// Decimal places used to decide whether two coordinates are the same point.
pub const DEFAULT_PRECISION: u32 = 6;
pub const MAX_PRECISION: u32 = 12;

/// Largest scaled coordinate whose integer key is still exact (2^53).
const MAX_SCALED_COORDINATE: f64 = 9_007_199_254_740_992.0;

/// What to do when two samples share the same `(x, y)` coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the intensity that appears last in the input.
    #[default]
    Overwrite,
    /// Refuse the input.
    Error,
}

type CoordinateKey = (i64, i64);

#[derive(Default)]
pub struct GridBuilder<'a> {
    samples: Option<&'a Samples>,
    precision: Option<&'a u32>,
    duplicate_policy: Option<&'a DuplicatePolicy>,
}

impl<'a> GridBuilder<'a> {
    pub fn build(&self) -> Result<Grid, GridBuilderError> {
        let now = Instant::now();
        let samples = self
            .samples
            .ok_or_else(|| GridBuilderError::UninitializedFieldError("samples".to_string()))?;
        Self::validate_samples(samples)?;
        let precision = self.precision.copied().unwrap_or(DEFAULT_PRECISION);
        Self::validate_precision(&precision)?;
        let policy = self.duplicate_policy.copied().unwrap_or_default();
        let scale = 10f64.powi(precision as i32);
        Self::validate_coordinates(samples, precision, scale)?;

        let x_axis = Self::build_axis(&samples.x, scale);
        let y_axis = Self::build_axis(&samples.y, scale);
        debug!("Axis sizes: x={}, y={}", x_axis.len(), y_axis.len());

        let (lookup, duplicates) = Self::build_lookup(samples, scale, policy)?;
        let data = Self::fill(&x_axis, &y_axis, &lookup, scale)?;

        info!(
            "Gridded {} samples into {} rows x {} columns",
            samples.len(),
            y_axis.len(),
            x_axis.len()
        );
        debug!("Took {} to build the grid.", format_duration(now.elapsed()));
        Ok(Grid::new(x_axis, y_axis, data, duplicates))
    }

    /// Unique values, highest first. The first raw value seen for a key is
    /// the one kept on the axis.
    fn build_axis(values: &[f64], scale: f64) -> Array1<f64> {
        let mut unique: BTreeMap<i64, f64> = BTreeMap::new();
        for &value in values {
            unique.entry(quantize(value, scale)).or_insert(value);
        }
        unique.values().rev().copied().collect()
    }

    fn build_lookup(
        samples: &Samples,
        scale: f64,
        policy: DuplicatePolicy,
    ) -> Result<(HashMap<CoordinateKey, f64>, usize), GridBuilderError> {
        let mut lookup = HashMap::with_capacity(samples.len());
        let mut duplicates = 0;
        for (x, y, z) in samples.iter() {
            let key = (quantize(x, scale), quantize(y, scale));
            if let Some(previous) = lookup.insert(key, z) {
                if policy == DuplicatePolicy::Error {
                    return Err(GridBuilderError::DuplicateSample { x, y });
                }
                duplicates += 1;
                if duplicates <= 5 {
                    warn!(
                        "Duplicate sample at x={} ppm, y={} ppm: replacing {} with {}",
                        x, y, previous, z
                    );
                }
            }
        }
        if duplicates > 5 {
            warn!("{} duplicate samples were overwritten in total", duplicates);
        }
        Ok((lookup, duplicates))
    }

    fn fill(
        x_axis: &Array1<f64>,
        y_axis: &Array1<f64>,
        lookup: &HashMap<CoordinateKey, f64>,
        scale: f64,
    ) -> Result<Array2<f64>, GridBuilderError> {
        let mut data = Array2::<f64>::zeros((y_axis.len(), x_axis.len()));
        let mut missing = 0;
        let mut first_missing = None;
        for (row, &y) in y_axis.iter().enumerate() {
            let y_key = quantize(y, scale);
            for (col, &x) in x_axis.iter().enumerate() {
                match lookup.get(&(quantize(x, scale), y_key)) {
                    Some(&z) => data[[row, col]] = z,
                    None => {
                        missing += 1;
                        if first_missing.is_none() {
                            first_missing = Some((x, y));
                        }
                    }
                }
            }
        }
        match first_missing {
            None => Ok(data),
            Some((x, y)) => Err(GridBuilderError::IncompleteGrid {
                missing,
                expected: data.len(),
                x,
                y,
            }),
        }
    }

    fn validate_samples(samples: &Samples) -> Result<(), GridBuilderError> {
        let (nx, ny, nz) = (samples.x.len(), samples.y.len(), samples.z.len());
        if nx != ny || ny != nz {
            return Err(GridBuilderError::LengthMismatch(nx, ny, nz));
        }
        if nz == 0 {
            return Err(GridBuilderError::EmptySamples);
        }
        Ok(())
    }

    fn validate_precision(precision: &u32) -> Result<(), GridBuilderError> {
        if *precision > MAX_PRECISION {
            return Err(GridBuilderError::InvalidPrecision {
                found: *precision,
                max: MAX_PRECISION,
            });
        }
        Ok(())
    }

    fn validate_coordinates(
        samples: &Samples,
        precision: u32,
        scale: f64,
    ) -> Result<(), GridBuilderError> {
        match samples
            .x
            .iter()
            .chain(samples.y.iter())
            .find(|v| (**v * scale).abs() > MAX_SCALED_COORDINATE)
        {
            Some(&value) => Err(GridBuilderError::CoordinateOutOfRange { value, precision }),
            None => Ok(()),
        }
    }

    pub fn samples(&mut self, samples: &'a Samples) -> &mut Self {
        self.samples = Some(samples);
        self
    }
    pub fn precision(&mut self, precision: &'a u32) -> &mut Self {
        self.precision = Some(precision);
        self
    }
    pub fn duplicate_policy(&mut self, duplicate_policy: &'a DuplicatePolicy) -> &mut Self {
        self.duplicate_policy = Some(duplicate_policy);
        self
    }
}

fn quantize(value: f64, scale: f64) -> i64 {
    (value * scale).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    fn grid_from(rows: &[(f64, f64, f64)]) -> Result<Grid, GridBuilderError> {
        let samples: Samples = rows.iter().copied().collect();
        let mut builder = GridBuilder::default();
        builder.samples(&samples);
        builder.build()
    }

    #[test]
    fn test_two_by_two_example() {
        let grid = grid_from(&[
            (1.0, 1.0, 10.0),
            (1.0, 2.0, 20.0),
            (2.0, 1.0, 30.0),
            (2.0, 2.0, 40.0),
        ])
        .unwrap();
        assert_eq!(grid.x_axis(), &array![2.0, 1.0]);
        assert_eq!(grid.y_axis(), &array![2.0, 1.0]);
        assert_eq!(grid.data(), &array![[40.0, 20.0], [30.0, 10.0]]);
        assert_eq!(grid.duplicates(), 0);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 2)]
    #[case(2, 5)]
    #[case(7, 4)]
    fn test_shape_and_cells(#[case] nx: usize, #[case] ny: usize) {
        // Emitted lowest y first, the opposite of grid order.
        let mut rows = Vec::new();
        for j in (0..ny).rev() {
            for i in 0..nx {
                let x = 100.0 + 0.25 * i as f64;
                let y = 8.0 - 0.125 * j as f64;
                rows.push((x, y, (i * 1000 + j) as f64));
            }
        }
        let grid = grid_from(&rows).unwrap();
        assert_eq!(grid.shape(), (ny, nx));

        for pair in grid.x_axis().to_vec().windows(2) {
            assert!(pair[0] > pair[1]);
        }
        for pair in grid.y_axis().to_vec().windows(2) {
            assert!(pair[0] > pair[1]);
        }

        for &(x, y, z) in &rows {
            let col = grid.x_axis().iter().position(|&v| v == x).unwrap();
            let row = grid.y_axis().iter().position(|&v| v == y).unwrap();
            assert_eq!(grid.data()[[row, col]], z);
        }
    }

    #[test]
    fn test_incomplete_grid() {
        let result = grid_from(&[(1.0, 1.0, 10.0), (1.0, 2.0, 20.0), (2.0, 1.0, 30.0)]);
        match result {
            Err(GridBuilderError::IncompleteGrid {
                missing,
                expected,
                x,
                y,
            }) => {
                assert_eq!(missing, 1);
                assert_eq!(expected, 4);
                assert_eq!((x, y), (2.0, 2.0));
            }
            other => panic!("expected incomplete grid, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_overwrite_keeps_last() {
        let grid = grid_from(&[
            (1.0, 1.0, 10.0),
            (1.0, 1.0, 11.0),
            (2.0, 1.0, 30.0),
        ])
        .unwrap();
        assert_eq!(grid.data(), &array![[30.0, 11.0]]);
        assert_eq!(grid.duplicates(), 1);
    }

    #[test]
    fn test_duplicate_error_policy() {
        let samples: Samples = vec![(1.0, 1.0, 10.0), (1.0, 1.0, 11.0)].into_iter().collect();
        let policy = DuplicatePolicy::Error;
        let result = GridBuilder::default()
            .samples(&samples)
            .duplicate_policy(&policy)
            .build();
        assert!(matches!(
            result,
            Err(GridBuilderError::DuplicateSample { x, y }) if x == 1.0 && y == 1.0
        ));
    }

    #[test]
    fn test_coordinates_within_precision_are_merged() {
        // 0.1 + 0.2 != 0.3 in binary floating point.
        let grid = grid_from(&[
            (0.1 + 0.2, 1.0, 1.0),
            (0.3, 2.0, 2.0),
            (0.5, 1.0, 3.0),
            (0.5, 2.0, 4.0),
        ])
        .unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.x_axis()[0], 0.5);
        assert_eq!(grid.x_axis()[1], 0.1 + 0.2);
        assert_eq!(grid.data(), &array![[4.0, 2.0], [3.0, 1.0]]);
    }

    #[test]
    fn test_coarse_precision() {
        let samples: Samples = vec![(1.01, 1.0, 1.0), (1.04, 1.0, 2.0)].into_iter().collect();
        let precision = 1;
        let grid = GridBuilder::default()
            .samples(&samples)
            .precision(&precision)
            .build()
            .unwrap();
        assert_eq!(grid.shape(), (1, 1));
        assert_eq!(grid.data()[[0, 0]], 2.0);
        assert_eq!(grid.duplicates(), 1);
    }

    #[test]
    fn test_invalid_precision() {
        let samples: Samples = vec![(1.0, 1.0, 1.0)].into_iter().collect();
        let precision = MAX_PRECISION + 1;
        assert!(matches!(
            GridBuilder::default()
                .samples(&samples)
                .precision(&precision)
                .build(),
            Err(GridBuilderError::InvalidPrecision { .. })
        ));
    }

    #[test]
    fn test_coordinate_too_large_for_precision() {
        let samples: Samples = vec![(1e7, 1.0, 1.0), (2e7, 1.0, 2.0)].into_iter().collect();
        let precision = MAX_PRECISION;
        assert!(matches!(
            GridBuilder::default()
                .samples(&samples)
                .precision(&precision)
                .build(),
            Err(GridBuilderError::CoordinateOutOfRange { value, precision: 12 }) if value == 1e7
        ));

        let precision = DEFAULT_PRECISION;
        let grid = GridBuilder::default()
            .samples(&samples)
            .precision(&precision)
            .build()
            .unwrap();
        assert_eq!(grid.x_axis(), &array![2e7, 1e7]);
    }

    #[test]
    fn test_uninitialized_samples() {
        assert!(matches!(
            GridBuilder::default().build(),
            Err(GridBuilderError::UninitializedFieldError(field)) if field == "samples"
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let samples = Samples {
            x: vec![1.0, 2.0],
            y: vec![1.0],
            z: vec![1.0, 2.0],
        };
        assert!(matches!(
            GridBuilder::default().samples(&samples).build(),
            Err(GridBuilderError::LengthMismatch(2, 1, 2))
        ));
    }
}
