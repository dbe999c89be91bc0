use crate::models::{BitMatrix, Point};

/// A finder pattern candidate (one of the three corner squares)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Center in image coordinates
    pub center: Point,
    /// Estimated module size in pixels
    pub module_size: f32,
    /// How many scan rows confirmed this candidate
    pub hits: usize,
}

impl FinderPattern {
    /// Candidate seen once at `(x, y)`
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            hits: 1,
        }
    }

    /// Same pattern seen again: close center and compatible module size
    fn about_equals(&self, center: &Point, module_size: f32) -> bool {
        if (center.x - self.center.x).abs() > module_size
            || (center.y - self.center.y).abs() > module_size
        {
            return false;
        }
        let diff = (module_size - self.module_size).abs();
        diff <= 1.0 || diff <= self.module_size
    }

    /// Fold another observation into the running average
    fn combine(&mut self, center: &Point, module_size: f32) {
        let n = self.hits as f32;
        self.center = Point::new(
            (self.center.x * n + center.x) / (n + 1.0),
            (self.center.y * n + center.y) / (n + 1.0),
        );
        self.module_size = (self.module_size * n + module_size) / (n + 1.0);
        self.hits += 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
    dark: bool,
}

/// Row scanner for finder patterns
pub struct FinderDetector;

impl FinderDetector {
    /// Find finder pattern candidates, most-confirmed first
    pub fn detect(matrix: &BitMatrix) -> Vec<FinderPattern> {
        let mut candidates: Vec<FinderPattern> = Vec::new();

        for y in 0..matrix.height() {
            let runs = Self::row_runs(matrix, y);
            for window in runs.windows(5) {
                if !window[0].dark {
                    continue;
                }
                let counts = [
                    window[0].len,
                    window[1].len,
                    window[2].len,
                    window[3].len,
                    window[4].len,
                ];
                if !Self::ratio_ok(&counts) {
                    continue;
                }
                let total: usize = counts.iter().sum();
                let center_x = window[2].start as f32 + window[2].len as f32 / 2.0;
                if let Some(pattern) =
                    Self::confirm(matrix, center_x as usize, y, window[2].len, total)
                {
                    Self::merge(&mut candidates, pattern);
                }
            }
        }

        candidates.sort_by(|a, b| b.hits.cmp(&a.hits));
        tracing::trace!(candidates = candidates.len(), "finder scan complete");
        candidates
    }

    fn row_runs(matrix: &BitMatrix, y: usize) -> Vec<Run> {
        let width = matrix.width();
        let mut runs = Vec::new();
        let mut run_start = 0usize;
        for x in 1..=width {
            if x == width || matrix.get(x, y) != matrix.get(run_start, y) {
                runs.push(Run {
                    start: run_start,
                    len: x - run_start,
                    dark: matrix.get(run_start, y),
                });
                run_start = x;
            }
        }
        runs
    }

    /// 1:1:3:1:1 within half a module per run (1.5 modules for the center)
    fn ratio_ok(counts: &[usize; 5]) -> bool {
        let total: usize = counts.iter().sum();
        if total < 7 {
            return false;
        }
        let module = total as f32 / 7.0;
        let max_variance = module / 2.0;
        let c: Vec<f32> = counts.iter().map(|&v| v as f32).collect();
        (module - c[0]).abs() < max_variance
            && (module - c[1]).abs() < max_variance
            && (3.0 * module - c[2]).abs() < 3.0 * max_variance
            && (module - c[3]).abs() < max_variance
            && (module - c[4]).abs() < max_variance
    }

    /// Vertical cross-check, then a horizontal re-measure through the new center
    fn confirm(
        matrix: &BitMatrix,
        x: usize,
        y: usize,
        max_count: usize,
        row_total: usize,
    ) -> Option<FinderPattern> {
        let (center_y, vertical_total) =
            Self::cross_check(matrix, x, y, max_count, row_total, Axis::Vertical)?;
        let (center_x, horizontal_total) = Self::cross_check(
            matrix,
            x,
            center_y as usize,
            max_count,
            row_total,
            Axis::Horizontal,
        )?;
        let module_size = (vertical_total + horizontal_total) as f32 / 14.0;
        Some(FinderPattern::new(center_x, center_y, module_size))
    }

    /// Measure the five runs through (x, y) along `axis`; returns the pattern
    /// center on that axis and the total run length
    fn cross_check(
        matrix: &BitMatrix,
        x: usize,
        y: usize,
        max_count: usize,
        original_total: usize,
        axis: Axis,
    ) -> Option<(f32, usize)> {
        let (fixed, origin, limit) = match axis {
            Axis::Vertical => (x as isize, y as isize, matrix.height() as isize),
            Axis::Horizontal => (y as isize, x as isize, matrix.width() as isize),
        };
        let dark = |pos: isize| match axis {
            Axis::Vertical => matrix.get_signed(fixed, pos),
            Axis::Horizontal => matrix.get_signed(pos, fixed),
        };

        let mut counts = [0usize; 5];

        let mut pos = origin;
        while pos >= 0 && dark(pos) {
            counts[2] += 1;
            pos -= 1;
        }
        if pos < 0 {
            return None;
        }
        while pos >= 0 && !dark(pos) && counts[1] <= max_count {
            counts[1] += 1;
            pos -= 1;
        }
        if pos < 0 || counts[1] > max_count {
            return None;
        }
        while pos >= 0 && dark(pos) && counts[0] <= max_count {
            counts[0] += 1;
            pos -= 1;
        }
        if counts[0] > max_count {
            return None;
        }

        pos = origin + 1;
        while pos < limit && dark(pos) {
            counts[2] += 1;
            pos += 1;
        }
        if pos >= limit {
            return None;
        }
        while pos < limit && !dark(pos) && counts[3] <= max_count {
            counts[3] += 1;
            pos += 1;
        }
        if pos >= limit || counts[3] > max_count {
            return None;
        }
        while pos < limit && dark(pos) && counts[4] <= max_count {
            counts[4] += 1;
            pos += 1;
        }
        if counts[4] > max_count {
            return None;
        }

        let total: usize = counts.iter().sum();
        if 5 * total.abs_diff(original_total) >= 2 * original_total {
            return None;
        }
        if !Self::ratio_ok(&counts) {
            return None;
        }
        let center = pos as f32 - counts[4] as f32 - counts[3] as f32 - counts[2] as f32 / 2.0;
        Some((center, total))
    }

    fn merge(candidates: &mut Vec<FinderPattern>, pattern: FinderPattern) {
        match candidates
            .iter_mut()
            .find(|c| c.about_equals(&pattern.center, pattern.module_size))
        {
            Some(existing) => existing.combine(&pattern.center, pattern.module_size),
            None => candidates.push(pattern),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Vertical,
    Horizontal,
}
