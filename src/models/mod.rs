/// Bit matrix for binarized images and sampled grids
pub mod matrix;
/// Image-space points
pub mod point;
/// Decode results and symbol parameters
pub mod qr_code;

pub use matrix::BitMatrix;
pub use point::Point;
pub use qr_code::{ECLevel, MaskPattern, QRCode, Version};
