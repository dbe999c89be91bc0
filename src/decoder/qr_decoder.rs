use crate::decoder::bitstream::BitstreamExtractor;
use crate::decoder::format::FormatInfo;
use crate::decoder::function_mask::FunctionMask;
use crate::decoder::modes::decode_segments;
use crate::decoder::unmask::unmask;
use crate::decoder::version::VersionInfo;
use crate::models::{BitMatrix, Point, QRCode};

mod geometry;
mod payload;

/// Main QR decoder that processes a detected QR region
pub struct QrDecoder;

impl QrDecoder {
    /// Decode the symbol whose finder centers are `top_left`, `top_right`
    /// and `bottom_left` (already ordered in symbol space).
    pub fn decode(
        binary: &BitMatrix,
        top_left: &Point,
        top_right: &Point,
        bottom_left: &Point,
        module_size: f32,
    ) -> Option<QRCode> {
        for dimension in
            geometry::candidate_dimensions(top_left, top_right, bottom_left, module_size)
        {
            let transforms = geometry::sampling_transforms(
                binary,
                top_left,
                top_right,
                bottom_left,
                dimension,
                module_size,
            );
            for transform in &transforms {
                let grid = geometry::sample_grid(binary, transform, dimension);
                if let Some(code) = Self::decode_from_matrix(&grid) {
                    return Some(code.located_at(*top_left, *top_right, *bottom_left));
                }
            }
        }
        None
    }

    /// Decode an upright module grid (one entry per module, true = dark)
    pub fn decode_from_matrix(grid: &BitMatrix) -> Option<QRCode> {
        if grid.width() != grid.height() {
            return None;
        }
        let version = VersionInfo::extract(grid)?;
        let format = FormatInfo::extract(grid)?;

        let func = FunctionMask::new(version);
        let mut unmasked = grid.clone();
        unmask(&mut unmasked, format.mask_pattern, &func);

        let codewords = BitstreamExtractor::codewords(&unmasked, &func);
        let data = payload::deinterleave_and_correct(&codewords, version, format.ec_level)?;
        let payload = decode_segments(&data, version)?;

        tracing::debug!(
            version = version.number(),
            ec_level = ?format.ec_level,
            "symbol decoded"
        );
        Some(QRCode::new(
            payload.bytes,
            payload.text,
            version,
            format.ec_level,
            format.mask_pattern,
        ))
    }
}
