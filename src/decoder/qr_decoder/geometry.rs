use crate::detector::alignment::find_alignment_pattern;
use crate::models::{BitMatrix, Point, Version};
use crate::utils::geometry::PerspectiveTransform;

/// Finder centers sit 3.5 modules in from the symbol edges
const FINDER_CENTER: f32 = 3.5;

/// Dimensions to try: the estimate first, then its neighbours
pub(super) fn candidate_dimensions(
    top_left: &Point,
    top_right: &Point,
    bottom_left: &Point,
    module_size: f32,
) -> Vec<usize> {
    if module_size <= 0.0 {
        return Vec::new();
    }
    let span = (top_left.distance(top_right) + top_left.distance(bottom_left)) / 2.0;
    let modules = span / module_size + 7.0;
    let estimate = ((modules - 17.0) / 4.0).round() as i32;

    [estimate, estimate - 1, estimate + 1]
        .into_iter()
        .filter_map(|v| u8::try_from(v).ok())
        .filter_map(Version::new)
        .map(|v| v.size())
        .collect()
}

/// Module-space to image transforms for one dimension, best first.
///
/// From version 2 the bottom-right alignment pattern anchors the fourth
/// corner; the parallelogram completion of the finders is the fallback.
pub(super) fn sampling_transforms(
    binary: &BitMatrix,
    top_left: &Point,
    top_right: &Point,
    bottom_left: &Point,
    dimension: usize,
    module_size: f32,
) -> Vec<PerspectiveTransform> {
    let dim = dimension as f32;
    let far = dim - FINDER_CENTER;
    let mut transforms = Vec::with_capacity(2);

    if dimension > 21 {
        let alignment = dim - 6.5;
        let s = (alignment - FINDER_CENTER) / (far - FINDER_CENTER);
        let estimate = Point::affine(top_left, top_right, bottom_left, s, s);
        if let Some(found) = find_alignment_pattern(binary, estimate, module_size) {
            let src = [
                Point::new(FINDER_CENTER, FINDER_CENTER),
                Point::new(far, FINDER_CENTER),
                Point::new(FINDER_CENTER, far),
                Point::new(alignment, alignment),
            ];
            let dst = [*top_left, *top_right, *bottom_left, found];
            transforms.extend(PerspectiveTransform::from_points(&src, &dst));
        }
    }

    let bottom_right = Point::affine(top_left, top_right, bottom_left, 1.0, 1.0);
    let src = [
        Point::new(FINDER_CENTER, FINDER_CENTER),
        Point::new(far, FINDER_CENTER),
        Point::new(FINDER_CENTER, far),
        Point::new(far, far),
    ];
    let dst = [*top_left, *top_right, *bottom_left, bottom_right];
    transforms.extend(PerspectiveTransform::from_points(&src, &dst));

    transforms
}

/// Sample the binarized image at every module center
pub(super) fn sample_grid(
    binary: &BitMatrix,
    transform: &PerspectiveTransform,
    dimension: usize,
) -> BitMatrix {
    let mut grid = BitMatrix::new(dimension, dimension);
    for y in 0..dimension {
        for x in 0..dimension {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some(p) = transform.transform(&center) else {
                continue;
            };
            if p.x >= 0.0 && p.y >= 0.0 {
                grid.set(x, y, binary.get(p.x as usize, p.y as usize));
            }
        }
    }
    grid
}
