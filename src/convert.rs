// csv2ucsf/src/convert.rs

use crate::grid::{DuplicatePolicy, Grid, GridBuilder, GridBuilderError, DEFAULT_PRECISION};
use crate::header::{axis_specs, AxisMetadata, HeaderError};
use crate::loader::{LoadError, Samples};
use crate::ucsf::{self, UcsfError, UcsfHeader};
use humantime::format_duration;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

pub const UCSF_EXTENSION: &str = "ucsf";
pub const DEFAULT_OWNER: &str = "user";

/// `spectrum.csv` becomes `spectrum.ucsf`, next to the input.
pub fn default_outfile(infile: &Path) -> PathBuf {
    infile.with_extension(UCSF_EXTENSION)
}

#[derive(Debug)]
pub struct ConversionSummary {
    pub infile: PathBuf,
    pub outfile: PathBuf,
    pub samples: usize,
    pub duplicates: usize,
    pub x: AxisMetadata,
    pub y: AxisMetadata,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

#[derive(Default)]
pub struct Conversion<'a> {
    infile: Option<&'a Path>,
    outfile: Option<&'a Path>,
    precision: Option<&'a u32>,
    duplicate_policy: Option<&'a DuplicatePolicy>,
    owner: Option<&'a str>,
    comment: Option<&'a str>,
    verify: bool,
}

impl<'a> Conversion<'a> {
    pub fn run(&self) -> Result<ConversionSummary, ConvertError> {
        let now = Instant::now();
        let infile = self
            .infile
            .ok_or_else(|| ConvertError::UninitializedFieldError("infile".to_string()))?;
        let outfile = match self.outfile {
            Some(path) => path.to_path_buf(),
            None => default_outfile(infile),
        };

        let samples = Samples::from_path(infile)?;
        let mut builder = GridBuilder::default();
        builder.samples(&samples);
        builder.precision(self.precision.unwrap_or(&DEFAULT_PRECISION));
        if let Some(policy) = self.duplicate_policy {
            builder.duplicate_policy(policy);
        }
        let grid = builder.build()?;
        let x = AxisMetadata::from_axis(grid.x_axis())?;
        let y = AxisMetadata::from_axis(grid.y_axis())?;
        info!("X axis: {}", x);
        info!("Y axis: {}", y);

        let specs = axis_specs(&x, &y)?;
        let header = UcsfHeader::new(
            &specs,
            self.owner.unwrap_or(DEFAULT_OWNER),
            self.comment.unwrap_or(""),
        )?;
        debug!("Tile shape: {:?}", header.tile());
        ucsf::write(&outfile, &header, &grid.to_f32())?;
        info!("Wrote {}", outfile.display());

        if self.verify {
            Self::check_written(&outfile, &grid)?;
        }

        let summary = ConversionSummary {
            infile: infile.to_path_buf(),
            samples: samples.len(),
            duplicates: grid.duplicates(),
            x,
            y,
            input_bytes: fs::metadata(infile)?.len(),
            output_bytes: fs::metadata(&outfile)?.len(),
            outfile,
        };
        debug!("Conversion took {}.", format_duration(now.elapsed()));
        Ok(summary)
    }

    fn check_written(outfile: &Path, grid: &Grid) -> Result<(), ConvertError> {
        let (header, data) = ucsf::read(outfile)?;
        if header.shape() != grid.shape() {
            return Err(ConvertError::VerificationFailed(format!(
                "shape {:?} was written as {:?}",
                grid.shape(),
                header.shape()
            )));
        }
        if data != grid.to_f32() {
            return Err(ConvertError::VerificationFailed(
                "intensities read back differ from the input".to_string(),
            ));
        }
        info!("Verified {}", outfile.display());
        Ok(())
    }

    pub fn infile(&mut self, infile: &'a Path) -> &mut Self {
        self.infile = Some(infile);
        self
    }
    pub fn outfile(&mut self, outfile: &'a Path) -> &mut Self {
        self.outfile = Some(outfile);
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
    pub fn owner(&mut self, owner: &'a str) -> &mut Self {
        self.owner = Some(owner);
        self
    }
    pub fn comment(&mut self, comment: &'a str) -> &mut Self {
        self.comment = Some(comment);
        self
    }
    pub fn verify(&mut self, verify: bool) -> &mut Self {
        self.verify = verify;
        self
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unitialized field on Conversion: {0}")]
    UninitializedFieldError(String),
    #[error(transparent)]
    LoadError(#[from] LoadError),
    #[error(transparent)]
    GridBuilderError(#[from] GridBuilderError),
    #[error(transparent)]
    HeaderError(#[from] HeaderError),
    #[error(transparent)]
    UcsfError(#[from] UcsfError),
    #[error("File IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Written file failed verification: {0}")]
    VerificationFailed(String),
}
