use crate::models::{BitMatrix, Version};

/// Function module mask for a specific QR version.
/// true = function module (not data), false = data module.
pub struct FunctionMask {
    mask: BitMatrix,
}

impl FunctionMask {
    /// Mark finders, separators, timing, alignment, format and version areas
    pub fn new(version: Version) -> Self {
        let size = version.size();
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators
        Self::mark_region(&mut mask, 0, 0, 9, 9);
        Self::mark_region(&mut mask, size - 8, 0, 8, 9);
        Self::mark_region(&mut mask, 0, size - 8, 9, 8);

        // Timing patterns (row 6 and column 6)
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        let align = alignment_pattern_positions(version);
        let last = align.len().saturating_sub(1);
        for (i, &cx) in align.iter().enumerate() {
            for (j, &cy) in align.iter().enumerate() {
                // The three corners already hold finder patterns
                let corner = (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
                if !corner {
                    Self::mark_region(&mut mask, cx - 2, cy - 2, 5, 5);
                }
            }
        }

        // Second copy of the format info plus the dark module
        Self::mark_region(&mut mask, size - 8, 8, 8, 1);
        Self::mark_region(&mut mask, 8, size - 8, 1, 8);

        if version.number() >= 7 {
            Self::mark_region(&mut mask, size - 11, 0, 3, 6);
            Self::mark_region(&mut mask, 0, size - 11, 6, 3);
        }

        Self { mask }
    }

    /// Modules per side
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// Whether `(x, y)` is reserved for a function pattern
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Modules left for data and error correction codewords
    pub fn data_modules_count(&self) -> usize {
        let size = self.size();
        size * size - self.mask.count_ones()
    }

    fn mark_region(mask: &mut BitMatrix, x: usize, y: usize, width: usize, height: usize) {
        for yy in y..y + height {
            for xx in x..x + width {
                mask.set(xx, yy, true);
            }
        }
    }
}

/// Alignment pattern centers (same list for rows and columns)
pub fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let v = version.number() as usize;
    if v == 1 {
        return Vec::new();
    }
    let num_align = v / 7 + 2;
    let step = if v == 32 {
        26
    } else {
        (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };

    let mut positions = vec![6usize];
    let size = version.size();
    positions.extend((0..num_align - 1).rev().map(|i| size - 7 - i * step));
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tables::raw_data_modules;

    fn v(n: u8) -> Version {
        Version::new(n).expect("valid version")
    }

    #[test]
    fn test_alignment_positions() {
        assert!(alignment_pattern_positions(v(1)).is_empty());
        assert_eq!(alignment_pattern_positions(v(2)), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(v(7)), vec![6, 22, 38]);
        assert_eq!(alignment_pattern_positions(v(15)), vec![6, 26, 48, 70]);
        assert_eq!(alignment_pattern_positions(v(32)), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_pattern_positions(v(36)), vec![6, 24, 50, 76, 102, 128, 154]);
    }

    #[test]
    fn test_data_module_count_matches_capacity() {
        for n in [1u8, 2, 6, 7, 14, 21, 32, 40] {
            let mask = FunctionMask::new(v(n));
            assert_eq!(mask.data_modules_count(), raw_data_modules(v(n)), "version {}", n);
        }
    }

    #[test]
    fn test_version_one_layout() {
        let mask = FunctionMask::new(v(1));
        assert_eq!(mask.size(), 21);
        assert!(mask.is_function(8, 8));
        assert!(mask.is_function(8, 13));
        assert!(mask.is_function(6, 10));
        assert!(!mask.is_function(9, 9));
        assert!(!mask.is_function(20, 20));
        assert_eq!(mask.data_modules_count(), 208);
    }
}
