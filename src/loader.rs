// csv2ucsf/src/loader.rs

use csv::{ReaderBuilder, Trim};
use humantime::format_duration;
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Parallel columns of a sparse 2D spectrum: sample `i` is `(x[i], y[i], z[i])`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Samples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Samples {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let now = Instant::now();
        let file = File::open(path)?;
        let samples = Self::from_reader(file)?;
        info!("Read {} samples from {}", samples.len(), path.display());
        debug!("Took {} to load samples.", format_duration(now.elapsed()));
        Ok(samples)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_text(&content)
    }

    /// Parses `xppm yppm intensity` rows. Fields are separated by commas or
    /// by any run of spaces and tabs. Everything after a `#` is a comment;
    /// lines left empty are skipped.
    pub fn from_text(content: &str) -> Result<Self, LoadError> {
        let delimiter = sniff_delimiter(content);
        debug!("Using delimiter {:?}", delimiter as char);
        // One output line per input line so record positions stay valid.
        let cleaned = content
            .lines()
            .map(|line| {
                let line = strip_comment(line);
                if delimiter == b',' {
                    line.to_string()
                } else {
                    line.replace('\t', " ")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(cleaned.as_bytes());

        let mut samples = Samples::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 3 {
                return Err(LoadError::FieldCount {
                    line,
                    found: fields.len(),
                });
            }
            samples.x.push(parse_field(fields[0], line, 1)?);
            samples.y.push(parse_field(fields[1], line, 2)?);
            samples.z.push(parse_field(fields[2], line, 3)?);
        }
        if samples.is_empty() {
            return Err(LoadError::EmptyInput);
        }
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| (x, y, z))
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
    }
}

impl FromIterator<(f64, f64, f64)> for Samples {
    fn from_iter<I: IntoIterator<Item = (f64, f64, f64)>>(iter: I) -> Self {
        let mut samples = Samples::default();
        for (x, y, z) in iter {
            samples.push(x, y, z);
        }
        samples
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    }
}

fn sniff_delimiter(content: &str) -> u8 {
    let first = content
        .lines()
        .map(strip_comment)
        .find(|line| !line.trim().is_empty());
    match first {
        Some(line) if line.contains(',') => b',',
        _ => b' ',
    }
}

fn parse_field(value: &str, line: u64, field: usize) -> Result<f64, LoadError> {
    let parsed = value.parse::<f64>().map_err(|_| LoadError::Parse {
        line,
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(LoadError::NonFinite {
            line,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: field {field} is not a number: {value:?}")]
    Parse {
        line: u64,
        field: usize,
        value: String,
    },
    #[error("Line {line}: expected 3 fields (xppm yppm intensity) but found {found}")]
    FieldCount { line: u64, found: usize },
    #[error("Line {line}: value {value:?} is not finite")]
    NonFinite { line: u64, value: String },
    #[error("Input contains no data rows")]
    EmptyInput,
}
