//! QR code data mode decoders
//!
//! The corrected data codewords are a sequence of segments, each introduced
//! by a 4-bit mode indicator:
//! - Numeric: digits packed three to 10 bits
//! - Alphanumeric: 45-character set packed two to 11 bits
//! - Byte: 8-bit data (UTF-8, ISO-8859-1, binary)
//! - Kanji: 13-bit Shift JIS values
//! - ECI, structured append and FNC1 headers, which carry no text

pub mod alphanumeric;
pub mod byte;
pub mod numeric;

use crate::models::Version;
use alphanumeric::AlphanumericDecoder;
use byte::ByteDecoder;
use numeric::NumericDecoder;

/// MSB-first reader over codeword bytes
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Start at the first bit of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bits consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bits left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }

    /// Read `count` (at most 32) bits; `None` if the stream is too short
    pub fn read(&mut self, count: usize) -> Option<u32> {
        if count > 32 || count > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.bytes[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }
        Some(value)
    }
}

/// Character set selected for byte segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// No ECI seen: UTF-8 with ISO-8859-1 fallback
    Auto,
    /// ECI 1 or 3
    Latin1,
    /// ECI 26
    Utf8,
}

impl Charset {
    fn from_eci(value: u32) -> Self {
        match value {
            1 | 3 => Charset::Latin1,
            26 => Charset::Utf8,
            _ => Charset::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Terminator,
    Numeric,
    Alphanumeric,
    StructuredAppend,
    Byte,
    Fnc1First,
    Eci,
    Kanji,
    Fnc1Second,
}

impl Mode {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b0000 => Some(Mode::Terminator),
            0b0001 => Some(Mode::Numeric),
            0b0010 => Some(Mode::Alphanumeric),
            0b0011 => Some(Mode::StructuredAppend),
            0b0100 => Some(Mode::Byte),
            0b0101 => Some(Mode::Fnc1First),
            0b0111 => Some(Mode::Eci),
            0b1000 => Some(Mode::Kanji),
            0b1001 => Some(Mode::Fnc1Second),
            _ => None,
        }
    }

    /// Width of the character count field
    fn count_bits(self, version: Version) -> usize {
        let tier = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        let widths = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
            Mode::Kanji => [8, 10, 12],
            _ => [0, 0, 0],
        };
        widths[tier]
    }
}

/// Decoded payload: raw segment bytes and the text they spell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Concatenated segment bytes
    pub bytes: Vec<u8>,
    /// Decoded text
    pub text: String,
}

/// Parse all segments of the data codewords
pub fn decode_segments(data: &[u8], version: Version) -> Option<Payload> {
    let mut reader = BitReader::new(data);
    let mut bytes = Vec::new();
    let mut text = String::new();
    let mut charset = Charset::Auto;

    while reader.remaining() >= 4 {
        let mode = Mode::from_bits(reader.read(4)?)?;
        match mode {
            Mode::Terminator => break,
            Mode::Numeric | Mode::Alphanumeric => {
                let count = reader.read(mode.count_bits(version))? as usize;
                let segment = if mode == Mode::Numeric {
                    NumericDecoder::decode(&mut reader, count)?
                } else {
                    AlphanumericDecoder::decode(&mut reader, count)?
                };
                bytes.extend_from_slice(segment.as_bytes());
                text.push_str(&segment);
            }
            Mode::Byte => {
                let count = reader.read(mode.count_bits(version))? as usize;
                let raw = ByteDecoder::decode(&mut reader, count)?;
                text.push_str(&ByteDecoder::to_text(&raw, charset));
                bytes.extend_from_slice(&raw);
            }
            Mode::Kanji => {
                let count = reader.read(mode.count_bits(version))? as usize;
                for _ in 0..count {
                    let value = reader.read(13)?;
                    bytes.extend_from_slice(&kanji_to_shift_jis(value).to_be_bytes());
                    // No Shift JIS table: each character becomes U+FFFD
                    text.push(char::REPLACEMENT_CHARACTER);
                }
            }
            Mode::Eci => charset = Charset::from_eci(read_eci(&mut reader)?),
            Mode::StructuredAppend => {
                // Sequence number, total and parity
                reader.read(16)?;
            }
            Mode::Fnc1First => {}
            Mode::Fnc1Second => {
                // Application indicator
                reader.read(8)?;
            }
        }
    }

    if text.is_empty() {
        return None;
    }
    Some(Payload { bytes, text })
}

/// ECI designator: 1, 2 or 3 bytes depending on the leading bits
fn read_eci(reader: &mut BitReader<'_>) -> Option<u32> {
    let first = reader.read(8)?;
    if first & 0x80 == 0 {
        Some(first & 0x7F)
    } else if first & 0xC0 == 0x80 {
        Some(((first & 0x3F) << 8) | reader.read(8)?)
    } else if first & 0xE0 == 0xC0 {
        Some(((first & 0x1F) << 16) | reader.read(16)?)
    } else {
        None
    }
}

fn kanji_to_shift_jis(value: u32) -> u16 {
    let assembled = ((value / 0xC0) << 8) | (value % 0xC0);
    let sjis = if assembled < 0x1F00 {
        assembled + 0x8140
    } else {
        assembled + 0xC140
    };
    sjis as u16
}
