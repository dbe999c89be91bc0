//! Alignment pattern detection
//! Alignment patterns appear in QR codes version 2 and above: a 5x5 square
//! whose row/column through the center reads light:dark:light at 1:1:1
//! inside the outer dark ring.
use crate::models::{BitMatrix, Point};

/// Search radius around the estimate, in modules
const SEARCH_RADIUS_MODULES: f32 = 4.0;

/// Locate the alignment pattern nearest to `estimate`.
///
/// Scans rows in a window of a few modules around the estimate for a
/// light/dark/light triple of module-sized runs, confirms each hit with a
/// vertical cross-check and keeps the confirmed center closest to the estimate.
pub fn find_alignment_pattern(
    matrix: &BitMatrix,
    estimate: Point,
    module_size: f32,
) -> Option<Point> {
    if module_size <= 0.0 || matrix.width() == 0 || matrix.height() == 0 {
        return None;
    }

    let radius = (SEARCH_RADIUS_MODULES * module_size).ceil() as isize;
    let cx = estimate.x as isize;
    let cy = estimate.y as isize;
    let x0 = (cx - radius).max(0) as usize;
    let x1 = ((cx + radius).max(0) as usize).min(matrix.width());
    let y0 = (cy - radius).max(0) as usize;
    let y1 = ((cy + radius).max(0) as usize).min(matrix.height());
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let mut best: Option<(f32, Point)> = None;
    for y in y0..y1 {
        let runs = window_runs(matrix, y, x0, x1);
        for triple in runs.windows(3) {
            let [(_, left, left_dark), (start, mid, mid_dark), (_, right, _)] =
                [triple[0], triple[1], triple[2]];
            if left_dark || !mid_dark {
                continue;
            }
            if !ratio_ok(&[left, mid, right], module_size) {
                continue;
            }
            let center_x = start as f32 + mid as f32 / 2.0;
            let Some(center_y) = cross_check_vertical(matrix, center_x as usize, y, module_size)
            else {
                continue;
            };
            let candidate = Point::new(center_x, center_y);
            let distance = candidate.distance_squared(&estimate);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
        }
    }

    best.map(|(_, point)| point)
}

/// Runs `(start, length, dark)` of row `y` restricted to `[x0, x1)`
fn window_runs(matrix: &BitMatrix, y: usize, x0: usize, x1: usize) -> Vec<(usize, usize, bool)> {
    let mut runs = Vec::new();
    let mut run_start = x0;
    for x in (x0 + 1)..=x1 {
        if x == x1 || matrix.get(x, y) != matrix.get(run_start, y) {
            runs.push((run_start, x - run_start, matrix.get(run_start, y)));
            run_start = x;
        }
    }
    runs
}

fn ratio_ok(counts: &[usize; 3], module_size: f32) -> bool {
    let max_variance = module_size / 2.0;
    counts
        .iter()
        .all(|&c| (module_size - c as f32).abs() < max_variance)
}

/// Confirm a candidate column: light, dark, light runs above/below (x, y),
/// each bounded by dark. Returns the vertical center of the dark run.
fn cross_check_vertical(matrix: &BitMatrix, x: usize, y: usize, module_size: f32) -> Option<f32> {
    let max_count = (module_size * 2.0).ceil() as usize;
    let height = matrix.height() as isize;
    let x = x as isize;
    let mut counts = [0usize; 3];

    let mut pos = y as isize;
    while pos >= 0 && matrix.get_signed(x, pos) && counts[1] <= max_count {
        counts[1] += 1;
        pos -= 1;
    }
    if pos < 0 || counts[1] > max_count {
        return None;
    }
    while pos >= 0 && !matrix.get_signed(x, pos) && counts[0] <= max_count {
        counts[0] += 1;
        pos -= 1;
    }
    if pos < 0 || counts[0] > max_count {
        return None;
    }

    pos = y as isize + 1;
    while pos < height && matrix.get_signed(x, pos) && counts[1] <= max_count {
        counts[1] += 1;
        pos += 1;
    }
    if pos >= height || counts[1] > max_count {
        return None;
    }
    while pos < height && !matrix.get_signed(x, pos) && counts[2] <= max_count {
        counts[2] += 1;
        pos += 1;
    }
    if pos >= height || counts[2] > max_count {
        return None;
    }

    if !ratio_ok(&counts, module_size) {
        return None;
    }
    Some(pos as f32 - counts[2] as f32 - counts[1] as f32 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_alignment(matrix: &mut BitMatrix, ox: usize, oy: usize, unit: usize) {
        for my in 0..5 {
            for mx in 0..5 {
                let ring = mx == 0 || mx == 4 || my == 0 || my == 4;
                if ring || (mx == 2 && my == 2) {
                    for dy in 0..unit {
                        for dx in 0..unit {
                            matrix.set(ox + mx * unit + dx, oy + my * unit + dy, true);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_finds_pattern_near_estimate() {
        let mut matrix = BitMatrix::new(80, 80);
        draw_alignment(&mut matrix, 30, 30, 4);

        // True center is (40, 40); the estimate is off by a module and a half
        let found = find_alignment_pattern(&matrix, Point::new(45.0, 35.0), 4.0)
            .expect("pattern should be found");
        assert!((found.x - 40.0).abs() < 0.6, "x = {}", found.x);
        assert!((found.y - 40.0).abs() < 0.6, "y = {}", found.y);
    }

    #[test]
    fn test_blank_region() {
        let matrix = BitMatrix::new(80, 80);
        assert!(find_alignment_pattern(&matrix, Point::new(40.0, 40.0), 4.0).is_none());
    }
}
