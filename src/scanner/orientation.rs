//! EXIF orientation (tag 0x0112) and the transform that makes an image upright

use image::DynamicImage;

/// The eight EXIF orientation values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExifOrientation {
    /// 1: already upright
    #[default]
    Normal,
    /// 2: mirrored left to right
    FlipHorizontal,
    /// 3: upside down
    Rotate180,
    /// 4: mirrored top to bottom
    FlipVertical,
    /// 5: mirrored across the main diagonal
    Transpose,
    /// 6: needs a 90 degree clockwise turn
    Rotate90,
    /// 7: mirrored across the anti-diagonal
    Transverse,
    /// 8: needs a 90 degree counter-clockwise turn
    Rotate270,
}

impl ExifOrientation {
    /// Orientation for an EXIF tag value; `None` outside 1..=8
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// The EXIF tag value
    pub fn tag(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Transpose => 5,
            Self::Rotate90 => 6,
            Self::Transverse => 7,
            Self::Rotate270 => 8,
        }
    }

    /// Whether applying this orientation changes the image
    pub fn is_identity(self) -> bool {
        self == Self::Normal
    }

    /// The upright version of `image`
    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image.clone(),
            Self::FlipHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVertical => image.flipv(),
            Self::Transpose => image.fliph().rotate270(),
            Self::Rotate90 => image.rotate90(),
            Self::Transverse => image.fliph().rotate90(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    /// 3x2 image with a distinct red value per pixel: red = 10 * (y * 3 + x)
    fn labelled() -> DynamicImage {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([(10 * (y * 3 + x)) as u8, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    fn red(img: &DynamicImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[0]
    }

    #[test]
    fn test_tag_round_trip() {
        for tag in 1..=8 {
            let orientation = ExifOrientation::from_tag(tag).expect("valid tag");
            assert_eq!(orientation.tag(), tag);
        }
        assert_eq!(ExifOrientation::from_tag(0), None);
        assert_eq!(ExifOrientation::from_tag(9), None);
    }

    #[test]
    fn test_mirrors() {
        let src = labelled();

        let h = ExifOrientation::FlipHorizontal.apply(&src);
        assert_eq!(h.dimensions(), (3, 2));
        assert_eq!(red(&h, 0, 0), 20);

        let v = ExifOrientation::FlipVertical.apply(&src);
        assert_eq!(red(&v, 0, 0), 30);

        let r = ExifOrientation::Rotate180.apply(&src);
        assert_eq!(red(&r, 0, 0), 50);
    }

    #[test]
    fn test_quarter_turns() {
        let src = labelled();

        // Clockwise: the bottom-left pixel becomes the top-left one
        let cw = ExifOrientation::Rotate90.apply(&src);
        assert_eq!(cw.dimensions(), (2, 3));
        assert_eq!(red(&cw, 0, 0), 30);
        assert_eq!(red(&cw, 1, 0), 0);

        // Counter-clockwise: the top-right pixel becomes the top-left one
        let ccw = ExifOrientation::Rotate270.apply(&src);
        assert_eq!(red(&ccw, 0, 0), 20);
        assert_eq!(red(&ccw, 0, 2), 0);
    }

    #[test]
    fn test_diagonal_mirrors() {
        let src = labelled();

        // Transpose: out(x, y) = in(y, x)
        let t = ExifOrientation::Transpose.apply(&src);
        assert_eq!(t.dimensions(), (2, 3));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(red(&t, x, y), red(&src, y, x));
            }
        }

        // Transverse: out(x, y) = in(w - 1 - y, h - 1 - x)
        let tv = ExifOrientation::Transverse.apply(&src);
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(red(&tv, x, y), red(&src, 2 - y, 1 - x));
            }
        }
    }
}
