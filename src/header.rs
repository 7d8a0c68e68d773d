// csv2ucsf/src/header.rs

use derive_builder::Builder;
use ndarray::Array1;
use ndarray_stats::errors::MinMaxError;
use ndarray_stats::QuantileExt;
use std::fmt;
use thiserror::Error;

/// ppm are stored as Hz against a nominal 100 MHz spectrometer. Downstream
/// tools rely on both constants; they are not real acquisition parameters.
pub const PPM_SCALE: f64 = 100.0;
pub const OBSERVE_FREQUENCY_MHZ: f64 = 100.0;

pub const DIRECT_AXIS_LABEL: &str = "w1";
pub const INDIRECT_AXIS_LABEL: &str = "w2";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMetadata {
    pub size: usize,
    pub min: f64,
    pub max: f64,
    /// Carrier in Hz.
    pub center: f64,
    /// Sweep width in Hz.
    pub sweep_width: f64,
}

impl AxisMetadata {
    pub fn from_axis(axis: &Array1<f64>) -> Result<Self, HeaderError> {
        let min = *axis.min()?;
        let max = *axis.max()?;
        Ok(Self {
            size: axis.len(),
            min,
            max,
            center: PPM_SCALE * ((max + min) / 2.),
            sweep_width: PPM_SCALE * (max - min),
        })
    }
}

impl fmt::Display for AxisMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} to {} ppm, carrier {} Hz, sweep width {} Hz",
            self.size, self.min, self.max, self.center, self.sweep_width
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisEncoding {
    Direct,
    States,
}

/// Everything the writer needs to know about one spectral dimension.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct AxisSpec {
    pub label: String,
    pub size: usize,
    #[builder(default = "OBSERVE_FREQUENCY_MHZ")]
    pub obs: f64,
    pub sw: f64,
    pub car: f64,
    pub encoding: AxisEncoding,
    #[builder(default = "false")]
    pub complex: bool,
    #[builder(default = "true")]
    pub freq: bool,
    #[builder(default = "false")]
    pub time: bool,
}

impl AxisSpec {
    /// Transmitter offset in ppm.
    pub fn xmtr_freq(&self) -> f64 {
        self.car / self.obs
    }
}

/// Both axes ordered as the file stores them: Y (indirect) first, X (direct)
/// second.
pub fn axis_specs(x: &AxisMetadata, y: &AxisMetadata) -> Result<[AxisSpec; 2], HeaderError> {
    Ok([indirect_axis_spec(y)?, direct_axis_spec(x)?])
}

pub fn direct_axis_spec(metadata: &AxisMetadata) -> Result<AxisSpec, HeaderError> {
    Ok(AxisSpecBuilder::default()
        .label(DIRECT_AXIS_LABEL)
        .size(metadata.size)
        .sw(metadata.sweep_width)
        .car(metadata.center)
        .encoding(AxisEncoding::Direct)
        .build()?)
}

pub fn indirect_axis_spec(metadata: &AxisMetadata) -> Result<AxisSpec, HeaderError> {
    Ok(AxisSpecBuilder::default()
        .label(INDIRECT_AXIS_LABEL)
        .size(metadata.size)
        .sw(metadata.sweep_width)
        .car(metadata.center)
        .encoding(AxisEncoding::States)
        .build()?)
}

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Cannot compute axis range of an empty axis")]
    MinMaxError(#[from] MinMaxError),
    #[error(transparent)]
    AxisSpecBuilderError(#[from] AxisSpecBuilderError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridBuilder;
    use crate::loader::Samples;
    use ndarray::array;

    #[test]
    fn test_axis_arithmetic() {
        let metadata = AxisMetadata::from_axis(&array![9.0, 6.5, 3.0, 1.0]).unwrap();
        assert_eq!(metadata.size, 4);
        assert_eq!(metadata.min, 1.0);
        assert_eq!(metadata.max, 9.0);
        assert_eq!(metadata.center, 500.0);
        assert_eq!(metadata.sweep_width, 800.0);
    }

    #[test]
    fn test_single_point_axis() {
        let metadata = AxisMetadata::from_axis(&array![4.7]).unwrap();
        assert_eq!(metadata.size, 1);
        assert_eq!(metadata.sweep_width, 0.0);
        assert!((metadata.center - 470.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_axis() {
        let axis: Array1<f64> = Array1::zeros(0);
        assert!(matches!(
            AxisMetadata::from_axis(&axis),
            Err(HeaderError::MinMaxError(_))
        ));
    }

    #[test]
    fn test_axis_specs_order_and_flags() {
        let samples: Samples = vec![
            (1.0, 100.0, 1.0),
            (9.0, 100.0, 2.0),
            (1.0, 130.0, 3.0),
            (9.0, 130.0, 4.0),
        ]
        .into_iter()
        .collect();
        let grid = GridBuilder::default().samples(&samples).build().unwrap();
        let x_meta = AxisMetadata::from_axis(grid.x_axis()).unwrap();
        let y_meta = AxisMetadata::from_axis(grid.y_axis()).unwrap();
        let [y, x] = axis_specs(&x_meta, &y_meta).unwrap();

        assert_eq!(y.label, "w2");
        assert_eq!(y.encoding, AxisEncoding::States);
        assert_eq!(y.size, 2);
        assert_eq!(y.car, 11500.0);
        assert_eq!(y.sw, 3000.0);
        assert!((y.xmtr_freq() - 115.0).abs() < 1e-12);

        assert_eq!(x.label, "w1");
        assert_eq!(x.encoding, AxisEncoding::Direct);
        assert_eq!(x.car, 500.0);
        assert_eq!(x.sw, 800.0);

        for spec in [&y, &x] {
            assert_eq!(spec.obs, 100.0);
            assert!(!spec.complex);
            assert!(spec.freq);
            assert!(!spec.time);
        }
    }

    #[test]
    fn test_axis_specs_take_given_metadata() {
        let x = AxisMetadata {
            size: 512,
            min: 6.0,
            max: 10.0,
            center: 800.0,
            sweep_width: 400.0,
        };
        let y = AxisMetadata {
            size: 128,
            min: 100.0,
            max: 130.0,
            center: 11500.0,
            sweep_width: 3000.0,
        };
        let [indirect, direct] = axis_specs(&x, &y).unwrap();
        assert_eq!((indirect.size, indirect.car, indirect.sw), (128, 11500.0, 3000.0));
        assert_eq!((direct.size, direct.car, direct.sw), (512, 800.0, 400.0));
    }

    #[test]
    fn test_builder_requires_label() {
        let result = AxisSpecBuilder::default()
            .size(4usize)
            .sw(1.0)
            .car(0.0)
            .encoding(AxisEncoding::Direct)
            .build();
        assert!(result.is_err());
    }
}
