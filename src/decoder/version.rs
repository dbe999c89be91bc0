use crate::models::{BitMatrix, Version};

/// BCH(18,6) generator: x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1
const VERSION_GENERATOR: u32 = 0x1F25;
const MAX_VERSION_ERRORS: u32 = 3;

/// Version info is 18 bits (6 data + 12 ECC) for versions 7-40
pub struct VersionInfo;

impl VersionInfo {
    /// Version of a sampled symbol.
    ///
    /// Below version 7 the dimension alone decides. From version 7 the two
    /// version blocks are read and the best one must agree with the dimension.
    pub fn extract(matrix: &BitMatrix) -> Option<Version> {
        let by_dimension = Version::from_dimension(matrix.width())?;
        if by_dimension.number() < 7 {
            return Some(by_dimension);
        }

        let (top_right, bottom_left) = Self::read_blocks(matrix);
        let (number, distance) = [top_right, bottom_left]
            .into_iter()
            .map(best_version)
            .min_by_key(|&(_, distance)| distance)?;

        if distance > MAX_VERSION_ERRORS {
            tracing::trace!(distance, "version info unreadable");
            return None;
        }
        let decoded = Version::new(number)?;
        (decoded == by_dimension).then_some(decoded)
    }

    /// Bit i sits at (size-11 + i%3, i/3) and transposed for the second copy
    fn read_blocks(matrix: &BitMatrix) -> (u32, u32) {
        let size = matrix.width();
        let mut top_right = 0u32;
        let mut bottom_left = 0u32;
        for i in 0..18 {
            let a = size - 11 + i % 3;
            let b = i / 3;
            if matrix.get(a, b) {
                top_right |= 1 << i;
            }
            if matrix.get(b, a) {
                bottom_left |= 1 << i;
            }
        }
        (top_right, bottom_left)
    }
}

/// 18-bit version word for a version number
pub fn encode_version(version: u8) -> u32 {
    let data = version as u32;
    let mut rem = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
    }
    (data << 12) | (rem & 0xFFF)
}

fn best_version(bits: u32) -> (u8, u32) {
    (7u8..=40)
        .map(|v| (v, (encode_version(v) ^ bits).count_ones()))
        .min_by_key(|&(_, distance)| distance)
        .unwrap_or((0, u32::MAX))
}
