use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// BCH(15,5) generator: x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
const FORMAT_GENERATOR: u16 = 0x537;
/// XOR applied to every format word so it is never all-zero
const FORMAT_MASK: u16 = 0x5412;
/// BCH(15,5) corrects up to three bit errors
const MAX_FORMAT_ERRORS: u32 = 3;

/// Format info is 15 bits (5 data + 10 ECC), stored twice in the symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Data mask applied to the symbol
    pub mask_pattern: MaskPattern,
}

impl FormatInfo {
    /// Read both copies and decode whichever is closer to a valid codeword
    pub fn extract(matrix: &BitMatrix) -> Option<Self> {
        if matrix.width() < 21 {
            return None;
        }

        let primary = best_codeword(Self::read_primary(matrix));
        let secondary = best_codeword(Self::read_secondary(matrix));
        let (data, distance) = if secondary.1 < primary.1 {
            secondary
        } else {
            primary
        };

        if distance > MAX_FORMAT_ERRORS {
            tracing::trace!(distance, "format info unreadable");
            return None;
        }
        Some(Self::from_data_bits(data))
    }

    /// Decode the five data bits: EC level (2 bits) then mask (3 bits)
    pub fn from_data_bits(data: u8) -> Self {
        Self {
            ec_level: ECLevel::from_format_bits(data >> 3),
            mask_pattern: MaskPattern::from_bits(data & 0x07),
        }
    }

    /// Copy next to the top-left finder, most significant bit first
    fn read_primary(matrix: &BitMatrix) -> u16 {
        let mut bits: u16 = 0;
        for x in [0, 1, 2, 3, 4, 5, 7, 8] {
            bits = (bits << 1) | matrix.get(x, 8) as u16;
        }
        for y in [7, 5, 4, 3, 2, 1, 0] {
            bits = (bits << 1) | matrix.get(8, y) as u16;
        }
        bits
    }

    /// Copy split between the top-right and bottom-left finders
    fn read_secondary(matrix: &BitMatrix) -> u16 {
        let size = matrix.width();
        let mut bits: u16 = 0;
        for i in 0..8 {
            if matrix.get(size - 1 - i, 8) {
                bits |= 1 << i;
            }
        }
        for i in 8..15 {
            if matrix.get(8, size - 15 + i) {
                bits |= 1 << i;
            }
        }
        bits
    }
}

/// Masked 15-bit format word for five data bits
pub fn encode_format(data: u8) -> u16 {
    let data = data as u16 & 0x1F;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
    }
    ((data << 10) | (rem & 0x3FF)) ^ FORMAT_MASK
}

/// Nearest valid format word: (data bits, Hamming distance)
fn best_codeword(bits: u16) -> (u8, u32) {
    (0u8..32)
        .map(|data| (data, (encode_format(data) ^ bits).count_ones()))
        .min_by_key(|&(_, distance)| distance)
        .unwrap_or((0, u32::MAX))
}
