//! Alphanumeric mode decoder (Mode 0010)
//! Character set: 0-9, A-Z, space, $%*+-./:
use super::BitReader;

const ALPHANUMERIC_TABLE: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Pairs = 11 bits, single = 6 bits
pub struct AlphanumericDecoder;

impl AlphanumericDecoder {
    /// Read `character_count` characters
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Option<String> {
        let mut result = String::with_capacity(character_count);
        let mut remaining = character_count;

        while remaining >= 2 {
            let value = reader.read(11)? as usize;
            if value >= 45 * 45 {
                return None;
            }
            result.push(ALPHANUMERIC_TABLE[value / 45] as char);
            result.push(ALPHANUMERIC_TABLE[value % 45] as char);
            remaining -= 2;
        }
        if remaining == 1 {
            let value = reader.read(6)? as usize;
            result.push(*ALPHANUMERIC_TABLE.get(value)? as char);
        }

        Some(result)
    }
}
