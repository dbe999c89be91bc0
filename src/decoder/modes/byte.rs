//! Byte mode decoder (Mode 0100) for 8-bit data
use super::{BitReader, Charset};

/// Byte segment reader
pub struct ByteDecoder;

impl ByteDecoder {
    /// Raw bytes of the segment
    pub fn decode(reader: &mut BitReader<'_>, character_count: usize) -> Option<Vec<u8>> {
        (0..character_count)
            .map(|_| reader.read(8).map(|b| b as u8))
            .collect()
    }

    /// Text for a byte segment under the active character set.
    ///
    /// Without an ECI designator the bytes are taken as UTF-8 and fall back
    /// to ISO-8859-1 when they are not valid UTF-8.
    pub fn to_text(bytes: &[u8], charset: Charset) -> String {
        match charset {
            Charset::Latin1 => latin1(bytes),
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Auto => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_owned(),
                Err(_) => latin1(bytes),
            },
        }
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
