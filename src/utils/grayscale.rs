//! RGB to luma conversion
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed with integer weights:
//! Y = (76*R + 150*G + 29*B) >> 8

const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8).min(255) as u8
}

/// Convert packed RGB (3 bytes per pixel) to one luma byte per pixel
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgb_to_grayscale_with_buffer(rgb, width, height, &mut gray);
    gray
}

/// Same as [`rgb_to_grayscale`] but writes into a caller-owned buffer.
///
/// The buffer is resized to `width * height`; pixels missing from a short
/// `rgb` slice are left at zero.
pub fn rgb_to_grayscale_with_buffer(rgb: &[u8], width: usize, height: usize, gray: &mut Vec<u8>) {
    let pixel_count = width * height;
    gray.clear();
    gray.resize(pixel_count, 0);

    for (out, px) in gray.iter_mut().zip(rgb.chunks_exact(3)) {
        *out = luma(px[0], px[1], px[2]);
    }
}
