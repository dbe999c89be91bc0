//! Test fixtures: a minimal QR encoder (byte mode, level M, versions 1-4)
//! and helpers that turn symbols into photographs-like RGB images.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// (data codewords per block, ECC codewords per block, blocks) at level M
const LEVEL_M: [(usize, usize, usize); 4] = [(16, 10, 1), (28, 16, 1), (44, 26, 1), (32, 18, 2)];

/// Pixels per module in rendered images
pub const SCALE: u32 = 8;
/// Quiet zone width in modules
pub const QUIET: u32 = 4;

struct Field {
    exp: [u8; 512],
    log: [u8; 256],
}

impl Field {
    fn new() -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= 0x11D;
            }
        }
        for i in 255..512 {
            exp[i] = exp[i - 255];
        }
        Self { exp, log }
    }

    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
        }
    }

    /// Remainder of data * x^n divided by the generator with roots alpha^0..alpha^(n-1)
    fn ecc(&self, data: &[u8], n: usize) -> Vec<u8> {
        let mut generator = vec![1u8];
        for i in 0..n {
            let mut next = vec![0u8; generator.len() + 1];
            for (j, &c) in generator.iter().enumerate() {
                next[j] ^= c;
                next[j + 1] ^= self.mul(c, self.exp[i]);
            }
            generator = next;
        }

        let mut rem = vec![0u8; n];
        for &d in data {
            let factor = d ^ rem[0];
            rem.remove(0);
            rem.push(0);
            for j in 0..n {
                rem[j] ^= self.mul(generator[j + 1], factor);
            }
        }
        rem
    }
}

fn push_bits(bits: &mut Vec<bool>, value: u32, count: usize) {
    for i in (0..count).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

/// Final interleaved codeword sequence for `text` at `version`
fn codewords(text: &str, version: usize) -> Vec<u8> {
    let (per_block, ecc_len, blocks) = LEVEL_M[version - 1];
    let capacity = per_block * blocks;

    let mut bits = Vec::new();
    push_bits(&mut bits, 0b0100, 4);
    push_bits(&mut bits, text.len() as u32, 8);
    for byte in text.bytes() {
        push_bits(&mut bits, byte as u32, 8);
    }
    let terminator = (capacity * 8 - bits.len()).min(4);
    bits.extend(std::iter::repeat_n(false, terminator));
    while bits.len() % 8 != 0 {
        bits.push(false);
    }

    let mut data: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect();
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if data.len() >= capacity {
            break;
        }
        data.push(pad);
    }

    let field = Field::new();
    let data_blocks: Vec<&[u8]> = data.chunks(per_block).collect();
    let ecc_blocks: Vec<Vec<u8>> = data_blocks.iter().map(|b| field.ecc(b, ecc_len)).collect();

    let mut out = Vec::with_capacity(capacity + ecc_len * blocks);
    for i in 0..per_block {
        out.extend(data_blocks.iter().map(|b| b[i]));
    }
    for i in 0..ecc_len {
        out.extend(ecc_blocks.iter().map(|b| b[i]));
    }
    out
}

fn format_bits(mask: u8) -> u16 {
    // Level M is 00
    let data = mask as u32;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    (((data << 10) | rem) ^ 0x5412) as u16
}

fn masked(mask: u8, x: usize, y: usize) -> bool {
    match mask {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        _ => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
    }
}

/// Module grid, `grid[y][x]`, true = dark
pub type Grid = Vec<Vec<bool>>;

struct Canvas {
    size: usize,
    dark: Grid,
    function: Vec<Vec<bool>>,
}

impl Canvas {
    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.dark[y][x] = dark;
        self.function[y][x] = true;
    }

    fn draw_format(&mut self, bits: u16) {
        let size = self.size;
        let bit = |i: usize| (bits >> i) & 1 == 1;
        for i in 0..6 {
            self.set_function(8, i, bit(i));
        }
        self.set_function(8, 7, bit(6));
        self.set_function(8, 8, bit(7));
        self.set_function(7, 8, bit(8));
        for i in 9..15 {
            self.set_function(14 - i, 8, bit(i));
        }
        for i in 0..8 {
            self.set_function(size - 1 - i, 8, bit(i));
        }
        for i in 8..15 {
            self.set_function(8, size - 15 + i, bit(i));
        }
        self.set_function(8, size - 8, true);
    }
}

fn build(codewords: &[u8], version: usize, mask: u8) -> Grid {
    let size = 17 + 4 * version;
    let mut canvas = Canvas {
        size,
        dark: vec![vec![false; size]; size],
        function: vec![vec![false; size]; size],
    };

    for i in 0..size {
        canvas.set_function(6, i, i % 2 == 0);
        canvas.set_function(i, 6, i % 2 == 0);
    }
    for (cx, cy) in [(3, 3), (size - 4, 3), (3, size - 4)] {
        for dy in -4isize..=4 {
            for dx in -4isize..=4 {
                let (x, y) = (cx as isize + dx, cy as isize + dy);
                if (0..size as isize).contains(&x) && (0..size as isize).contains(&y) {
                    let ring = dx.abs().max(dy.abs());
                    canvas.set_function(x as usize, y as usize, ring != 2 && ring != 4);
                }
            }
        }
    }
    if version >= 2 {
        let c = size - 7;
        for dy in -2isize..=2 {
            for dx in -2isize..=2 {
                let ring = dx.abs().max(dy.abs());
                canvas.set_function(
                    (c as isize + dx) as usize,
                    (c as isize + dy) as usize,
                    ring != 1,
                );
            }
        }
    }
    canvas.draw_format(0);

    let bits: Vec<bool> = codewords
        .iter()
        .flat_map(|&c| (0..8).map(move |i| (c >> (7 - i)) & 1 == 1))
        .collect();
    let mut k = 0;
    let mut right = size as isize - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..size {
            for j in 0..2 {
                let x = (right - j) as usize;
                let upward = ((right + 1) & 2) == 0;
                let y = if upward { size - 1 - vert } else { vert };
                if !canvas.function[y][x] {
                    if k < bits.len() {
                        canvas.dark[y][x] = bits[k];
                    }
                    k += 1;
                }
            }
        }
        right -= 2;
    }

    for y in 0..size {
        for x in 0..size {
            if !canvas.function[y][x] && masked(mask, x, y) {
                canvas.dark[y][x] = !canvas.dark[y][x];
            }
        }
    }
    canvas.draw_format(format_bits(mask));
    canvas.dark
}

/// Simplified penalty score; keeps finder-like runs out of the data area
fn penalty(grid: &Grid) -> usize {
    let n = grid.len();
    let mut score = 0;
    let columns: Vec<Vec<bool>> = (0..n).map(|x| (0..n).map(|y| grid[y][x]).collect()).collect();
    const FINDER_LIKE: [bool; 7] = [true, false, true, true, true, false, true];

    for line in grid.iter().chain(columns.iter()) {
        let mut run = 1;
        for i in 1..n {
            if line[i] == line[i - 1] {
                run += 1;
            } else {
                if run >= 5 {
                    score += run - 2;
                }
                run = 1;
            }
        }
        if run >= 5 {
            score += run - 2;
        }

        for i in 0..n.saturating_sub(6) {
            if line[i..i + 7] != FINDER_LIKE {
                continue;
            }
            let light_before = i < 4 || line[i - 4..i].iter().all(|&d| !d);
            let light_after = i + 11 > n || line[i + 7..i + 11].iter().all(|&d| !d);
            if light_before || light_after {
                score += 40;
            }
        }
    }

    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let c = grid[y][x];
            if grid[y][x + 1] == c && grid[y + 1][x] == c && grid[y + 1][x + 1] == c {
                score += 3;
            }
        }
    }

    let dark = grid.iter().flatten().filter(|&&d| d).count();
    score + (dark * 20).abs_diff(n * n * 10) / (n * n) * 10
}

/// Encode `text` in byte mode at level M in the smallest version 1-4 that fits
pub fn encode(text: &str) -> Grid {
    let bits_needed = 12 + 8 * text.len();
    let version = (1..=4)
        .find(|&v| {
            let (per_block, _, blocks) = LEVEL_M[v - 1];
            per_block * blocks * 8 >= bits_needed
        })
        .expect("payload fits in version 4-M");
    let codewords = codewords(text, version);
    (0..8u8)
        .map(|mask| build(&codewords, version, mask))
        .min_by_key(penalty)
        .expect("eight masks")
}

/// Render a module grid at `SCALE` pixels per module inside a quiet zone
pub fn render(grid: &Grid) -> RgbImage {
    let n = grid.len() as u32;
    let side = (n + 2 * QUIET) * SCALE;
    RgbImage::from_fn(side, side, |x, y| {
        let mx = (x / SCALE) as i64 - QUIET as i64;
        let my = (y / SCALE) as i64 - QUIET as i64;
        let dark = (0..n as i64).contains(&mx)
            && (0..n as i64).contains(&my)
            && grid[my as usize][mx as usize];
        if dark {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Upright RGB image of `text`
pub fn symbol_image(text: &str) -> RgbImage {
    render(&encode(text))
}

/// Rotate clockwise by `degrees` about the center onto a white canvas large
/// enough to hold the whole image (nearest-neighbour sampling)
pub fn rotate_by(image: &RgbImage, degrees: f32) -> RgbImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let (sin, cos) = degrees.to_radians().sin_cos();
    let side = (w * cos.abs() + h * sin.abs()).ceil() as u32 + 2;
    let (cx, cy) = ((w - 1.0) / 2.0, (h - 1.0) / 2.0);
    let center = (side as f32 - 1.0) / 2.0;

    RgbImage::from_fn(side, side, |x, y| {
        let (dx, dy) = (x as f32 - center, y as f32 - center);
        let sx = (cos * dx + sin * dy + cx).round();
        let sy = (-sin * dx + cos * dy + cy).round();
        if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
            *image.get_pixel(sx as u32, sy as u32)
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Same image re-encoded as PNG bytes
pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding");
    bytes
}

/// JPEG bytes of `image` carrying an EXIF orientation `tag` (APP1 right
/// after the start-of-image marker)
pub fn jpeg_bytes_with_orientation(image: &RgbImage, tag: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode_image(image)
        .expect("JPEG encoding");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "start of image");

    // Big-endian TIFF header, one IFD holding a single SHORT entry
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&tag.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let length = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + length as usize + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(b"Exif\x00\x00");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
