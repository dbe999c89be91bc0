//! Utility functions for image processing
//!
//! - Grayscale conversion (RGB to luminance)
//! - Binarization (Otsu and adaptive mean)
//! - Geometry (perspective transforms)

/// Otsu and adaptive thresholding
pub mod binarization;
pub mod geometry;
pub mod grayscale;
