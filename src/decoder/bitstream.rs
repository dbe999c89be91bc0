use crate::decoder::function_mask::FunctionMask;
use crate::models::BitMatrix;

/// Reads data modules in the standard zig-zag order
pub struct BitstreamExtractor;

impl BitstreamExtractor {
    /// Data module bits, starting bottom-right and moving up in column pairs
    pub fn extract(matrix: &BitMatrix, func: &FunctionMask) -> Vec<bool> {
        let size = func.size();
        let mut bits = Vec::with_capacity(func.data_modules_count());

        let mut right = size as isize - 1;
        while right >= 1 {
            // The vertical timing column is skipped entirely
            if right == 6 {
                right = 5;
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for x in [right as usize, right as usize - 1] {
                    if !func.is_function(x, y) {
                        bits.push(matrix.get(x, y));
                    }
                }
            }
            right -= 2;
        }

        bits
    }

    /// Pack the zig-zag bits into codewords, MSB first; remainder bits dropped
    pub fn codewords(matrix: &BitMatrix, func: &FunctionMask) -> Vec<u8> {
        Self::extract(matrix, func)
            .chunks_exact(8)
            .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Version;

    #[test]
    fn test_bit_count_matches_data_modules() {
        for n in [1u8, 3, 7] {
            let func = FunctionMask::new(Version::new(n).expect("valid"));
            let matrix = BitMatrix::new(func.size(), func.size());
            let bits = BitstreamExtractor::extract(&matrix, &func);
            assert_eq!(bits.len(), func.data_modules_count());
        }
    }

    #[test]
    fn test_first_codeword_position() {
        // The first codeword of a 21x21 symbol fills the bottom-right 2x4 block
        let func = FunctionMask::new(Version::new(1).expect("v1"));
        let mut matrix = BitMatrix::new(21, 21);
        matrix.set(20, 20, true); // bit 7
        matrix.set(19, 19, true); // bit 4
        matrix.set(19, 17, true); // bit 0

        let codewords = BitstreamExtractor::codewords(&matrix, &func);
        assert_eq!(codewords.len(), 26);
        assert_eq!(codewords[0], 0b1001_0001);
    }
}
