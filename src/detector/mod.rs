//! QR code detection modules
//!
//! - Finder pattern detection (the three square markers)
//! - Alignment pattern search (versions 2 and above)

/// Alignment pattern search around an estimated position
pub mod alignment;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
