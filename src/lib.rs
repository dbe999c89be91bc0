//! qr_inventory - QR code scanning with a find-or-create record store
//!
//! Two halves that meet in the [`Inventory`] facade:
//! - [`scanner`]: orientation-robust decoding of photographed QR codes
//!   (EXIF correction, one colour conversion, a four-step rotation cascade)
//!   on top of a pure Rust detector and decoder;
//! - [`inventory`]: a CSV-backed record store keyed by the decoded code.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Runtime configuration
pub mod config;
/// QR code decoding modules (error correction, format extraction, data modes)
pub mod decoder;
/// QR code detection modules (finder and alignment patterns)
pub mod detector;
/// Error types
pub mod error;
/// Record store and find-or-create workflow
pub mod inventory;
/// Core data structures (QRCode, BitMatrix, Point, etc.)
pub mod models;
/// Orientation correction and rotation cascade
pub mod scanner;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

mod pipeline;

pub use config::InventoryConfig;
pub use error::{Error, Result, ScanError, StoreError};
pub use inventory::{
    Category, Inventory, InventoryRecord, Lookup, NewRecord, RecordStore, Registration,
    ScanLookup, Statistics, StoreOptions,
};
pub use models::{BitMatrix, ECLevel, MaskPattern, Point, QRCode, Version};
pub use scanner::{
    ExifOrientation, QrReader, Rotation, ScanConfig, ScanImage, ScanReport, Scanner, SymbolReader,
};

use detector::finder::FinderDetector;
use utils::binarization::{adaptive_binarize, otsu_binarize};
use utils::grayscale::rgb_to_grayscale;

/// Images at least this large on either side start with adaptive thresholding
const ADAPTIVE_MIN_SIDE: usize = 800;
/// Neighbourhood of the adaptive binarizer
const ADAPTIVE_WINDOW: usize = 31;

/// Detect QR codes in an RGB image
///
/// # Arguments
/// * `image` - Raw RGB bytes (3 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Decoded QR codes, best-scored finder group first. The buffer is read as
/// is; callers wanting rotation robustness go through [`Scanner`].
pub fn detect(image: &[u8], width: usize, height: usize) -> Vec<QRCode> {
    if width == 0 || height == 0 || image.len() < width * height * 3 {
        return Vec::new();
    }
    let gray = rgb_to_grayscale(image, width, height);
    detect_from_grayscale(&gray, width, height)
}

/// Detect QR codes in an 8-bit luma buffer (`width * height` bytes)
pub fn detect_from_grayscale(gray: &[u8], width: usize, height: usize) -> Vec<QRCode> {
    if width == 0 || height == 0 || gray.len() < width * height {
        return Vec::new();
    }

    let large = width >= ADAPTIVE_MIN_SIDE || height >= ADAPTIVE_MIN_SIDE;
    let binarize = |adaptive: bool| {
        if adaptive {
            adaptive_binarize(gray, width, height, ADAPTIVE_WINDOW)
        } else {
            otsu_binarize(gray, width, height)
        }
    };

    // Adaptive first on large images, Otsu on small; the other one is the fallback
    for adaptive in [large, !large] {
        let binary = binarize(adaptive);
        let patterns = FinderDetector::detect(&binary);
        tracing::trace!(adaptive, patterns = patterns.len(), "finder patterns");
        if patterns.len() < 3 {
            continue;
        }
        let results = pipeline::decode_candidates(&binary, &patterns);
        if !results.is_empty() {
            return results;
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image() {
        assert!(detect(&[], 0, 0).is_empty());
        assert!(detect(&[0; 5], 10, 10).is_empty());
    }

    #[test]
    fn test_uniform_image() {
        let white = vec![255u8; 64 * 48 * 3];
        assert!(detect(&white, 64, 48).is_empty());
        let black = vec![0u8; 64 * 48];
        assert!(detect_from_grayscale(&black, 64, 48).is_empty());
    }
}
