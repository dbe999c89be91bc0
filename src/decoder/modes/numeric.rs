//! Numeric mode decoder (Mode 0001)
//! Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits
use super::BitReader;

/// Numeric segment reader
pub struct NumericDecoder;

impl NumericDecoder {
    /// Read `character_count` digits
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Option<String> {
        let mut result = String::with_capacity(character_count);
        let mut remaining = character_count;

        while remaining > 0 {
            let group = remaining.min(3);
            let (bits, limit) = match group {
                3 => (10, 1000),
                2 => (7, 100),
                _ => (4, 10),
            };
            let value = reader.read(bits)?;
            if value >= limit {
                return None;
            }
            result.push_str(&format!("{:0width$}", value, width = group));
            remaining -= group;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_groups() {
        // 012 (10 bits) 345 (10 bits) -> 0000001100 0101011001
        let bytes = [0b0000_0011, 0b0001_0101, 0b1001_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 6).as_deref(), Some("012345"));
        assert_eq!(reader.position(), 20);
    }

    #[test]
    fn test_numeric_short_tail() {
        // 012 (10 bits) 34 (7 bits) -> 0000001100 0100010
        let bytes = [0b0000_0011, 0b0001_0001, 0b0000_0000];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 5).as_deref(), Some("01234"));
        assert_eq!(reader.position(), 17);
    }

    #[test]
    fn test_numeric_rejects_out_of_range_group() {
        // 1111111111 = 1023 is not a three-digit group
        let bytes = [0xFF, 0xC0];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(NumericDecoder::decode(&mut reader, 3), None);
    }
}
