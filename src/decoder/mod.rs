//! QR code decoding modules
//!
//! Everything after detection: sampling the module grid, reading format and
//! version information, unmasking, Reed-Solomon correction and segment parsing.

/// Bitstream extraction from QR matrix
pub mod bitstream;
/// Format information extraction (mask pattern, EC level)
pub mod format;
/// Function module mask builder (finder/timing/format/alignment/version)
pub mod function_mask;
/// Data mode decoders (numeric, alphanumeric, byte, kanji)
pub mod modes;
/// Main QR decoder that orchestrates the decoding pipeline
pub mod qr_decoder;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Codeword and block tables per version and EC level
pub mod tables;
/// QR code unmasking (removes mask patterns)
pub mod unmask;
/// Version information extraction (versions 7-40)
pub mod version;
