use super::Point;

/// QR code version (1-40, Model 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    /// Version from its number; `None` outside 1..=40
    pub fn new(number: u8) -> Option<Self> {
        (1..=40).contains(&number).then_some(Self(number))
    }

    /// Version whose symbol is `dimension` modules wide
    pub fn from_dimension(dimension: usize) -> Option<Self> {
        if dimension < 21 || (dimension - 17) % 4 != 0 {
            return None;
        }
        u8::try_from((dimension - 17) / 4).ok().and_then(Self::new)
    }

    /// The version number
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Size in modules (width = height)
    pub fn size(&self) -> usize {
        4 * self.0 as usize + 17
    }
}

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// Level from the two format-information bits (01=L, 00=M, 11=Q, 10=H)
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }

    /// Row index into the block tables (L, M, Q, H order)
    pub fn ordinal(&self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPattern {
    /// (row + col) % 2 == 0
    Pattern0,
    /// row % 2 == 0
    Pattern1,
    /// col % 3 == 0
    Pattern2,
    /// (row + col) % 3 == 0
    Pattern3,
    /// (row / 2 + col / 3) % 2 == 0
    Pattern4,
    /// (row * col) % 2 + (row * col) % 3 == 0
    Pattern5,
    /// ((row * col) % 2 + (row * col) % 3) % 2 == 0
    Pattern6,
    /// ((row + col) % 2 + (row * col) % 3) % 2 == 0
    Pattern7,
}

impl MaskPattern {
    /// Mask pattern from the three format-information bits
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MaskPattern::Pattern0,
            1 => MaskPattern::Pattern1,
            2 => MaskPattern::Pattern2,
            3 => MaskPattern::Pattern3,
            4 => MaskPattern::Pattern4,
            5 => MaskPattern::Pattern5,
            6 => MaskPattern::Pattern6,
            _ => MaskPattern::Pattern7,
        }
    }

    /// Whether the module at (row, col) is inverted by this mask
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (row + col) % 2 == 0,
            MaskPattern::Pattern1 => row % 2 == 0,
            MaskPattern::Pattern2 => col % 3 == 0,
            MaskPattern::Pattern3 => (row + col) % 3 == 0,
            MaskPattern::Pattern4 => (row / 2 + col / 3) % 2 == 0,
            MaskPattern::Pattern5 => (row * col) % 2 + (row * col) % 3 == 0,
            MaskPattern::Pattern6 => ((row * col) % 2 + (row * col) % 3) % 2 == 0,
            MaskPattern::Pattern7 => ((row + col) % 2 + (row * col) % 3) % 2 == 0,
        }
    }
}

/// A decoded QR symbol
#[derive(Debug, Clone)]
pub struct QRCode {
    /// Raw payload bytes (all segments concatenated)
    pub data: Vec<u8>,
    /// Payload as text
    pub content: String,
    /// Symbol version
    pub version: Version,
    /// Error correction level
    pub error_correction: ECLevel,
    /// Mask pattern used
    pub mask_pattern: MaskPattern,
    /// Finder centers in image coordinates (top-left, top-right, bottom-left)
    pub finders: [Point; 3],
}

impl QRCode {
    /// A decoded symbol with no location attached yet
    pub fn new(
        data: Vec<u8>,
        content: String,
        version: Version,
        error_correction: ECLevel,
        mask_pattern: MaskPattern,
    ) -> Self {
        Self {
            data,
            content,
            version,
            error_correction,
            mask_pattern,
            finders: [Point::default(); 3],
        }
    }

    /// Attach the finder centers the symbol was sampled from
    pub fn located_at(mut self, top_left: Point, top_right: Point, bottom_left: Point) -> Self {
        self.finders = [top_left, top_right, bottom_left];
        self
    }
}
