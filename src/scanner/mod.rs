//! Orientation-robust decoding of a photographed QR code.
//!
//! A scan runs in three steps:
//! 1. undo the EXIF orientation of the input,
//! 2. convert once to packed RGB (downscaling very large photographs),
//! 3. try the symbol reader on the buffer, turning it a quarter turn
//!    counter-clockwise after each miss, for at most four attempts.
//!
//! The first payload of the first successful attempt wins.

mod orientation;
mod scan_image;

pub use orientation::ExifOrientation;
pub use scan_image::ScanImage;

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Default longest side handed to the reader
pub const DEFAULT_MAX_DIMENSION: u32 = 1600;

/// Something that reads symbol payloads out of an upright RGB buffer
pub trait SymbolReader {
    /// Payloads found, in the reader's decode order
    fn read_symbols(&self, image: &RgbImage) -> Vec<String>;
}

impl<F> SymbolReader for F
where
    F: Fn(&RgbImage) -> Vec<String>,
{
    fn read_symbols(&self, image: &RgbImage) -> Vec<String> {
        self(image)
    }
}

/// The crate's own QR decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct QrReader;

impl SymbolReader for QrReader {
    fn read_symbols(&self, image: &RgbImage) -> Vec<String> {
        crate::detect(
            image.as_raw(),
            image.width() as usize,
            image.height() as usize,
        )
        .into_iter()
        .map(|code| code.content)
        .collect()
    }
}

/// How far the working buffer had been turned counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// As oriented
    None,
    /// 90 degrees
    Quarter,
    /// 180 degrees
    Half,
    /// 270 degrees
    ThreeQuarter,
}

impl Rotation {
    /// Attempt order of the cascade
    pub const CASCADE: [Rotation; 4] = [
        Rotation::None,
        Rotation::Quarter,
        Rotation::Half,
        Rotation::ThreeQuarter,
    ];

    /// Angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }
}

/// Scanner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Longest side fed to the reader; larger images are downscaled once
    pub max_dimension: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_dimension: Some(DEFAULT_MAX_DIMENSION),
        }
    }
}

/// Outcome of a successful scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Decoded payload
    pub payload: String,
    /// Rotation of the attempt that succeeded
    pub rotation: Rotation,
    /// Number of reader calls made
    pub attempts: usize,
}

/// Runs the orientation correction and rotation cascade around a reader
#[derive(Debug, Clone, Default)]
pub struct Scanner<R = QrReader> {
    reader: R,
    config: ScanConfig,
}

impl Scanner<QrReader> {
    /// Scanner backed by the built-in QR decoder
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: SymbolReader> Scanner<R> {
    /// Scanner backed by another reader
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader,
            config: ScanConfig::default(),
        }
    }

    /// Replace the settings
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Current settings
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Decode with diagnostics; `None` when no attempt found a symbol
    pub fn scan(&self, image: &ScanImage) -> Option<ScanReport> {
        let mut working = self.prepare(image);

        for (index, rotation) in Rotation::CASCADE.into_iter().enumerate() {
            if index > 0 {
                working = imageops::rotate270(&working);
            }
            let symbols = self.reader.read_symbols(&working);
            tracing::debug!(
                rotation = rotation.degrees(),
                found = symbols.len(),
                "decode attempt"
            );
            if let Some(payload) = symbols.into_iter().next() {
                return Some(ScanReport {
                    payload,
                    rotation,
                    attempts: index + 1,
                });
            }
        }

        tracing::debug!("no symbol after full rotation cascade");
        None
    }

    /// Decoded payload, if any
    pub fn decode(&self, image: &ScanImage) -> Option<String> {
        self.scan(image).map(|report| report.payload)
    }

    /// Orientation correction, the single colour conversion and downscaling
    fn prepare(&self, image: &ScanImage) -> RgbImage {
        let rgb = if image.orientation().is_identity() {
            image.image().to_rgb8()
        } else {
            image.upright().to_rgb8()
        };

        let (width, height) = rgb.dimensions();
        match self.config.max_dimension {
            Some(max) if max > 0 && width.max(height) > max => {
                let scale = max as f64 / width.max(height) as f64;
                let new_width = ((width as f64 * scale).round() as u32).max(1);
                let new_height = ((height as f64 * scale).round() as u32).max(1);
                tracing::debug!(width, height, new_width, new_height, "downscaling input");
                imageops::resize(&rgb, new_width, new_height, FilterType::Triangle)
            }
            _ => rgb,
        }
    }
}

/// Decode `image` with the built-in QR reader
pub fn decode(image: &ScanImage) -> Option<String> {
    Scanner::new().decode(image)
}
