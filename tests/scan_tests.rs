mod common;

use image::imageops::{flip_horizontal, rotate90, rotate180, rotate270};
use image::{DynamicImage, Rgb, RgbImage};
use qr_inventory::scanner::{self, ExifOrientation, Rotation, ScanImage, Scanner};

const PAYLOADS: [&str; 4] = [
    "A1",
    "INV-0042 Widget",
    "https://example.com/inventory/item/12345",
    "Amplifier rack 7 / shelf B / bin 12 / serial 99",
];

fn scan_image(image: RgbImage) -> ScanImage {
    ScanImage::new(DynamicImage::ImageRgb8(image))
}

#[test]
fn test_upright_symbol_decodes_on_first_attempt() {
    let report = Scanner::new()
        .scan(&scan_image(common::symbol_image("A1")))
        .expect("symbol decodes");
    assert_eq!(report.payload, "A1");
    assert_eq!(report.rotation, Rotation::None);
    assert_eq!(report.attempts, 1);
}

#[test]
fn test_every_rotation_yields_same_payload() {
    for payload in PAYLOADS {
        let upright = common::symbol_image(payload);
        let turned = [
            upright.clone(),
            rotate90(&upright),
            rotate180(&upright),
            rotate270(&upright),
        ];
        for (quarter, image) in turned.into_iter().enumerate() {
            assert_eq!(
                scanner::decode(&scan_image(image)).as_deref(),
                Some(payload),
                "{payload:?} rotated {} degrees",
                quarter * 90
            );
        }
    }
}

#[test]
fn test_tilted_symbol_decodes_without_quarter_turns() {
    for payload in PAYLOADS {
        let upright = common::symbol_image(payload);
        for degrees in [35.0, 40.0, 45.0, 50.0, 55.0, 135.0, 225.0] {
            let report = Scanner::new()
                .scan(&scan_image(common::rotate_by(&upright, degrees)))
                .unwrap_or_else(|| panic!("{payload:?} tilted {degrees} degrees"));
            assert_eq!(report.payload, payload);
            assert_eq!(report.attempts, 1);
        }
    }
}

#[test]
fn test_non_ascii_payload() {
    let image = scan_image(common::symbol_image("Relé 24V – bancada 3"));
    assert_eq!(
        scanner::decode(&image).as_deref(),
        Some("Relé 24V – bancada 3")
    );
}

#[test]
fn test_mirrored_symbol_needs_orientation() {
    let mirrored = flip_horizontal(&common::symbol_image("A1"));

    assert_eq!(scanner::decode(&scan_image(mirrored.clone())), None);

    let tagged = scan_image(mirrored).with_orientation(ExifOrientation::FlipHorizontal);
    assert_eq!(scanner::decode(&tagged).as_deref(), Some("A1"));
}

#[test]
fn test_transverse_orientation_restores_symbol() {
    // Stored so that flip-then-rotate-clockwise brings it upright
    let stored = flip_horizontal(&rotate270(&common::symbol_image("INV-0042 Widget")));
    let tagged = scan_image(stored)
        .with_orientation(ExifOrientation::from_tag(7).expect("valid tag"));
    assert_eq!(scanner::decode(&tagged).as_deref(), Some("INV-0042 Widget"));
}

/// Reader that only accepts symbols whose top-right finder is right of the
/// top-left one and whose bottom-left finder is below it
fn upright_only(image: &RgbImage) -> Vec<String> {
    qr_inventory::detect(image.as_raw(), image.width() as usize, image.height() as usize)
        .into_iter()
        .filter(|code| {
            let [tl, tr, bl] = code.finders;
            tr.x - tl.x > 8.0 && bl.y - tl.y > 8.0
        })
        .map(|code| code.content)
        .collect()
}

#[test]
fn test_reader_accepting_only_upright_input() {
    let turned = scan_image(rotate180(&common::symbol_image("A1")));
    let report = Scanner::with_reader(upright_only)
        .scan(&turned)
        .expect("found after a half turn");
    assert_eq!(report.payload, "A1");
    assert_eq!(report.rotation, Rotation::Half);
    assert_eq!(report.attempts, 3);
}

#[test]
fn test_jpeg_orientation_tag_is_applied() {
    // Camera stored the label turned a quarter counter-clockwise; tag 6 says
    // to turn it back clockwise
    let stored = rotate270(&common::symbol_image("INV-0042 Widget"));
    let bytes = common::jpeg_bytes_with_orientation(&stored, 6);

    let image = ScanImage::from_bytes(&bytes).expect("valid JPEG");
    assert_eq!(image.orientation(), ExifOrientation::Rotate90);

    let report = Scanner::with_reader(upright_only)
        .scan(&image)
        .expect("upright after orientation");
    assert_eq!(report.payload, "INV-0042 Widget");
    assert_eq!(report.rotation, Rotation::None);
    assert_eq!(report.attempts, 1);

    let untagged = ScanImage::from_bytes(&common::jpeg_bytes_with_orientation(&stored, 1))
        .expect("valid JPEG");
    assert_eq!(untagged.orientation(), ExifOrientation::Normal);
    assert!(
        Scanner::with_reader(upright_only)
            .scan(&untagged)
            .is_some_and(|report| report.attempts > 1)
    );
}

#[test]
fn test_images_without_symbol() {
    let blank = RgbImage::from_pixel(200, 150, Rgb([255, 255, 255]));
    assert_eq!(scanner::decode(&scan_image(blank)), None);

    // Deterministic speckle
    let mut state = 0x2545_F491u32;
    let noise = RgbImage::from_fn(160, 160, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let v = if state & 1 == 0 { 0 } else { 255 };
        Rgb([v, v, v])
    });
    assert_eq!(scanner::decode(&scan_image(noise)), None);
}

#[test]
fn test_png_bytes_round_trip() {
    let bytes = common::png_bytes(&rotate90(&common::symbol_image("A1")));
    let image = ScanImage::from_bytes(&bytes).expect("valid PNG");
    assert_eq!(image.orientation(), ExifOrientation::Normal);
    assert_eq!(scanner::decode(&image).as_deref(), Some("A1"));
}

#[test]
fn test_open_reads_file() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("label.png");
    std::fs::write(&path, common::png_bytes(&common::symbol_image("B7"))).expect("write png");

    let image = ScanImage::open(&path).expect("readable image");
    assert_eq!(scanner::decode(&image).as_deref(), Some("B7"));
}

#[test]
fn test_not_an_image_is_an_error() {
    assert!(ScanImage::from_bytes(b"definitely not an image").is_err());
}
