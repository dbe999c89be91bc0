use crate::models::BitMatrix;

/// Otsu threshold: the luma value that maximizes between-class variance.
///
/// Pixels `<=` the returned value belong to the dark class.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut weight_dark = 0.0f64;
    let mut sum_dark = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut best_threshold = 0u8;

    for (value, &count) in histogram.iter().enumerate() {
        weight_dark += count as f64;
        if weight_dark == 0.0 {
            continue;
        }
        let weight_light = total - weight_dark;
        if weight_light == 0.0 {
            break;
        }
        sum_dark += value as f64 * count as f64;
        let mean_dark = sum_dark / weight_dark;
        let mean_light = (sum_all - sum_dark) / weight_light;
        let variance = weight_dark * weight_light * (mean_dark - mean_light).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = value as u8;
        }
    }

    best_threshold
}

/// Binarize with a single global Otsu threshold. true = dark
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    let threshold = otsu_threshold(gray);
    let mut binary = BitMatrix::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if gray[y * width + x] <= threshold {
                binary.set(x, y, true);
            }
        }
    }
    binary
}

/// Percentage below the local mean a pixel must fall to count as dark
const ADAPTIVE_OFFSET_PERCENT: u64 = 15;

/// Binarize against the mean of a `window`-sized neighbourhood (integral image).
///
/// Copes with uneven lighting in photographs; large uniform dark areas wider
/// than the window come out light, which is why callers fall back to Otsu.
pub fn adaptive_binarize(gray: &[u8], width: usize, height: usize, window: usize) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);
    if width == 0 || height == 0 {
        return binary;
    }

    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let half = (window / 2).max(1);
    for y in 0..height {
        let y0 = y.saturating_sub(half);
        let y1 = (y + half + 1).min(height);
        for x in 0..width {
            let x0 = x.saturating_sub(half);
            let x1 = (x + half + 1).min(width);
            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let pixel = gray[y * width + x] as u64;
            if pixel * area * 100 < sum * (100 - ADAPTIVE_OFFSET_PERCENT) {
                binary.set(x, y, true);
            }
        }
    }

    binary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otsu_binarize() {
        let mut gray = vec![50u8; 50];
        gray.extend(vec![200u8; 50]);

        let binary = otsu_binarize(&gray, 10, 10);
        assert!(binary.get(0, 0));
        assert!(!binary.get(0, 7));
    }

    #[test]
    fn test_otsu_uniform_image_has_no_dark_pixels() {
        let gray = vec![128u8; 64];
        let binary = otsu_binarize(&gray, 8, 8);
        assert_eq!(binary.count_ones(), 0);
    }

    #[test]
    fn test_adaptive_handles_gradient() {
        // Dark dot on a bright-to-dim gradient: a global threshold would lose it
        let width = 40;
        let height = 10;
        let mut gray: Vec<u8> = (0..width * height)
            .map(|i| 250 - ((i % width) * 3) as u8)
            .collect();
        gray[5 * width + 35] = 20;

        let binary = adaptive_binarize(&gray, width, height, 15);
        assert!(binary.get(35, 5));
        assert!(!binary.get(34, 5));
        assert!(!binary.get(5, 5));
    }
}
