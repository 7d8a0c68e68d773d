// csv2ucsf/src/ucsf/header.rs

use super::errors::UcsfError;
use super::tiles::{tile_shape, TILE_KBYTE_MAX};
use crate::header::AxisSpec;
use chrono::Local;

pub const UCSF_IDENT: &str = "UCSF NMR";
pub const FILE_HEADER_SIZE: usize = 180;
pub const AXIS_HEADER_SIZE: usize = 128;

const IDENT_LEN: usize = 10;
const OWNER_LEN: usize = 9;
const DATE_LEN: usize = 26;
const COMMENT_LEN: usize = 80;
const NUCLEUS_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct FileHeader {
    pub ident: String,
    pub naxis: u8,
    pub ncomponents: u8,
    pub encoding: u8,
    pub version: u8,
    pub owner: String,
    pub date: String,
    pub comment: String,
    pub seek_pos: i32,
}

impl FileHeader {
    pub fn new(owner: &str, comment: &str) -> Self {
        Self {
            ident: UCSF_IDENT.to_string(),
            naxis: 2,
            ncomponents: 1,
            encoding: 0,
            version: 2,
            owner: owner.to_string(),
            // ctime(3) layout, e.g. "Fri Nov  6 14:03:51 2020"
            date: Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
            comment: comment.to_string(),
            seek_pos: 0,
        }
    }

    pub fn to_bytes(&self) -> Result<[u8; FILE_HEADER_SIZE], UcsfError> {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        put_str(&mut buf[0..10], &self.ident, "ident")?;
        buf[10] = self.naxis;
        buf[11] = self.ncomponents;
        buf[12] = self.encoding;
        buf[13] = self.version;
        put_str(&mut buf[14..23], &self.owner, "owner")?;
        put_str(&mut buf[23..49], &self.date, "date")?;
        put_str(&mut buf[49..129], &self.comment, "comment")?;
        buf[132..136].copy_from_slice(&self.seek_pos.to_be_bytes());
        Ok(buf)
    }

    pub fn from_bytes(buf: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            ident: get_str(&buf[0..IDENT_LEN]),
            naxis: buf[10],
            ncomponents: buf[11],
            encoding: buf[12],
            version: buf[13],
            owner: get_str(&buf[14..14 + OWNER_LEN]),
            date: get_str(&buf[23..23 + DATE_LEN]),
            comment: get_str(&buf[49..49 + COMMENT_LEN]),
            seek_pos: i32::from_be_bytes([buf[132], buf[133], buf[134], buf[135]]),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisHeader {
    pub nucleus: String,
    pub spectral_shift: i16,
    pub npoints: u32,
    pub size: u32,
    pub bsize: u32,
    pub spectrometer_freq: f32,
    pub spectral_width: f32,
    pub xmtr_freq: f32,
    pub zero_order: f32,
    pub first_order: f32,
    pub first_pt_scale: f32,
}

impl AxisHeader {
    pub fn from_spec(spec: &AxisSpec, bsize: usize) -> Result<Self, UcsfError> {
        let npoints = u32::try_from(spec.size).map_err(|_| UcsfError::AxisTooLarge(spec.size))?;
        Ok(Self {
            nucleus: spec.label.clone(),
            spectral_shift: 0,
            npoints,
            size: npoints,
            bsize: bsize as u32,
            spectrometer_freq: spec.obs as f32,
            spectral_width: spec.sw as f32,
            xmtr_freq: spec.xmtr_freq() as f32,
            zero_order: 0.,
            first_order: 0.,
            first_pt_scale: 0.,
        })
    }

    pub fn to_bytes(&self) -> Result<[u8; AXIS_HEADER_SIZE], UcsfError> {
        let mut buf = [0u8; AXIS_HEADER_SIZE];
        put_str(&mut buf[0..NUCLEUS_LEN], &self.nucleus, "nucleus")?;
        buf[6..8].copy_from_slice(&self.spectral_shift.to_be_bytes());
        buf[8..12].copy_from_slice(&self.npoints.to_be_bytes());
        buf[12..16].copy_from_slice(&self.size.to_be_bytes());
        buf[16..20].copy_from_slice(&self.bsize.to_be_bytes());
        let floats = [
            self.spectrometer_freq,
            self.spectral_width,
            self.xmtr_freq,
            self.zero_order,
            self.first_order,
            self.first_pt_scale,
        ];
        for (i, value) in floats.iter().enumerate() {
            let offset = 20 + 4 * i;
            buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        }
        Ok(buf)
    }

    pub fn from_bytes(buf: &[u8; AXIS_HEADER_SIZE]) -> Self {
        let u32_at = |o: usize| u32::from_be_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]);
        let f32_at = |o: usize| f32::from_bits(u32_at(o));
        Self {
            nucleus: get_str(&buf[0..NUCLEUS_LEN]),
            spectral_shift: i16::from_be_bytes([buf[6], buf[7]]),
            npoints: u32_at(8),
            size: u32_at(12),
            bsize: u32_at(16),
            spectrometer_freq: f32_at(20),
            spectral_width: f32_at(24),
            xmtr_freq: f32_at(28),
            zero_order: f32_at(32),
            first_order: f32_at(36),
            first_pt_scale: f32_at(40),
        }
    }
}

/// File header plus the two axis headers, in file order (rows axis first).
#[derive(Clone, Debug, PartialEq)]
pub struct UcsfHeader {
    pub file: FileHeader,
    pub axes: [AxisHeader; 2],
}

impl UcsfHeader {
    pub fn new(specs: &[AxisSpec; 2], owner: &str, comment: &str) -> Result<Self, UcsfError> {
        let (tile_rows, tile_cols) = tile_shape((specs[0].size, specs[1].size), TILE_KBYTE_MAX);
        Ok(Self {
            file: FileHeader::new(owner, comment),
            axes: [
                AxisHeader::from_spec(&specs[0], tile_rows)?,
                AxisHeader::from_spec(&specs[1], tile_cols)?,
            ],
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.axes[0].size as usize, self.axes[1].size as usize)
    }

    pub fn tile(&self) -> (usize, usize) {
        (self.axes[0].bsize as usize, self.axes[1].bsize as usize)
    }
}

fn put_str(dest: &mut [u8], value: &str, field: &'static str) -> Result<(), UcsfError> {
    let bytes = value.as_bytes();
    if bytes.len() > dest.len() {
        return Err(UcsfError::FieldTooLong {
            field,
            max: dest.len(),
            value: value.to_string(),
        });
    }
    dest[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn get_str(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}
