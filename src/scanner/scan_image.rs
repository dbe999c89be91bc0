//! Scan input: a decoded raster plus its EXIF orientation

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader};

use super::orientation::ExifOrientation;
use crate::error::ScanResult;

/// An image handed to the scanner
#[derive(Debug, Clone)]
pub struct ScanImage {
    image: DynamicImage,
    orientation: ExifOrientation,
}

impl ScanImage {
    /// Wrap an in-memory image that is already upright
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: ExifOrientation::Normal,
        }
    }

    /// Attach an orientation, as if read from EXIF metadata
    pub fn with_orientation(mut self, orientation: ExifOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Decode PNG or JPEG bytes, keeping the orientation tag when present.
    ///
    /// Missing or unreadable orientation metadata counts as upright.
    pub fn from_bytes(bytes: &[u8]) -> ScanResult<Self> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder
            .orientation()
            .ok()
            .and_then(|o| ExifOrientation::from_tag(o.to_exif()))
            .unwrap_or_default();
        let image = DynamicImage::from_decoder(decoder)?;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            orientation = orientation.tag(),
            "image loaded"
        );
        Ok(Self { image, orientation })
    }

    /// Read and decode an image file
    pub fn open(path: impl AsRef<Path>) -> ScanResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// The stored raster, before orientation correction
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Orientation that [`ExifOrientation::apply`] will undo
    pub fn orientation(&self) -> ExifOrientation {
        self.orientation
    }

    /// The raster turned upright
    pub fn upright(&self) -> DynamicImage {
        self.orientation.apply(&self.image)
    }
}

impl From<DynamicImage> for ScanImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}
