use crate::decoder::qr_decoder::QrDecoder;
use crate::detector::finder::FinderPattern;
use crate::models::{BitMatrix, Point, QRCode};

/// Only the best-confirmed finder candidates take part in grouping
const MAX_PATTERNS: usize = 24;
/// Upper bound on triples handed to the decoder per binarization
const MAX_GROUPS: usize = 40;

/// A finder triple ordered in symbol space
#[derive(Debug, Clone, Copy)]
struct Candidate {
    members: [usize; 3],
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    module_size: f32,
    score: f32,
}

/// Group finder patterns into triples and decode them, best-scored first.
///
/// A finder that took part in a successful decode is not reused.
pub(crate) fn decode_candidates(binary: &BitMatrix, patterns: &[FinderPattern]) -> Vec<QRCode> {
    let candidates = group_finder_patterns(binary, patterns);
    tracing::trace!(
        patterns = patterns.len(),
        groups = candidates.len(),
        "grouped finder patterns"
    );

    let mut used = vec![false; patterns.len()];
    let mut results = Vec::new();
    for candidate in candidates {
        if candidate.members.iter().any(|&i| used[i]) {
            continue;
        }
        if let Some(code) = QrDecoder::decode(
            binary,
            &candidate.top_left,
            &candidate.top_right,
            &candidate.bottom_left,
            candidate.module_size,
        ) {
            for &i in &candidate.members {
                used[i] = true;
            }
            results.push(code);
        }
    }
    results
}

fn group_finder_patterns(binary: &BitMatrix, patterns: &[FinderPattern]) -> Vec<Candidate> {
    let considered = patterns.len().min(MAX_PATTERNS);
    let mut groups = Vec::new();

    for i in 0..considered {
        for j in (i + 1)..considered {
            for k in (j + 1)..considered {
                let triple = [&patterns[i], &patterns[j], &patterns[k]];
                if !plausible_triple(triple) {
                    continue;
                }
                let Some([tl, tr, bl]) = order_finder_patterns(triple[0], triple[1], triple[2])
                else {
                    continue;
                };
                let measured = measure_module_size(binary, tl, tr, bl);
                if let Some(module_size) = symbol_module_size(tl, tr, bl, measured) {
                    groups.push(Candidate {
                        members: [i, j, k],
                        top_left: tl.center,
                        top_right: tr.center,
                        bottom_left: bl.center,
                        module_size,
                        score: group_score(triple),
                    });
                }
            }
        }
    }

    groups.sort_by(|a, b| a.score.total_cmp(&b.score));
    groups.truncate(MAX_GROUPS);
    groups
}

/// Similar module sizes, sensible spacing and one near-right angle
fn plausible_triple(triple: [&FinderPattern; 3]) -> bool {
    let (min_size, max_size) = min_max(triple.map(|p| p.module_size));
    if min_size <= 0.0 || max_size / min_size > 2.0 {
        return false;
    }

    let [d01, d02, d12] = side_lengths(triple);
    let (min_d, max_d) = min_max([d01, d02, d12]);
    let avg_module = triple.iter().map(|p| p.module_size).sum::<f32>() / 3.0;
    if min_d < avg_module * 2.5 || max_d / min_d > 5.0 {
        return false;
    }

    best_cosine([d01, d02, d12]) < 0.4
}

/// Lower is better: size consistency, shape distortion and squareness
fn group_score(triple: [&FinderPattern; 3]) -> f32 {
    let (min_size, max_size) = min_max(triple.map(|p| p.module_size));
    let sides = side_lengths(triple);
    let (min_d, max_d) = min_max(sides);
    (max_size / min_size) * 2.0 + max_d / min_d + best_cosine(sides)
}

fn side_lengths(triple: [&FinderPattern; 3]) -> [f32; 3] {
    [
        triple[0].center.distance(&triple[1].center),
        triple[0].center.distance(&triple[2].center),
        triple[1].center.distance(&triple[2].center),
    ]
}

/// Smallest |cos| among the three angles of the triangle
fn best_cosine([d01, d02, d12]: [f32; 3]) -> f32 {
    let (a2, b2, c2) = (d01 * d01, d02 * d02, d12 * d12);
    let cos_0 = (a2 + b2 - c2) / (2.0 * d01 * d02);
    let cos_1 = (a2 + c2 - b2) / (2.0 * d01 * d12);
    let cos_2 = (b2 + c2 - a2) / (2.0 * d02 * d12);
    cos_0.abs().min(cos_1.abs()).min(cos_2.abs())
}

fn min_max(values: [f32; 3]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Order three finders as (top-left, top-right, bottom-left).
///
/// The top-left finder is the right-angle corner; the cross product of the
/// other two decides which one is top-right (y grows downwards).
fn order_finder_patterns<'a>(
    a: &'a FinderPattern,
    b: &'a FinderPattern,
    c: &'a FinderPattern,
) -> Option<[&'a FinderPattern; 3]> {
    let patterns = [a, b, c];

    if patterns.iter().any(|p| p.module_size < 1.0) {
        return None;
    }

    let mut best_idx = 0usize;
    let mut best_cos = f32::INFINITY;
    for i in 0..3 {
        let p = &patterns[i].center;
        let p1 = &patterns[(i + 1) % 3].center;
        let p2 = &patterns[(i + 2) % 3].center;

        let (v1x, v1y) = (p1.x - p.x, p1.y - p.y);
        let (v2x, v2y) = (p2.x - p.x, p2.y - p.y);
        let denom = (v1x * v1x + v1y * v1y).sqrt() * (v2x * v2x + v2y * v2y).sqrt();
        if denom == 0.0 {
            continue;
        }
        let cos = ((v1x * v2x + v1y * v2y) / denom).abs();
        if cos < best_cos {
            best_cos = cos;
            best_idx = i;
        }
    }

    let tl = patterns[best_idx];
    let p1 = patterns[(best_idx + 1) % 3];
    let p2 = patterns[(best_idx + 2) % 3];

    let cross = (p1.center.x - tl.center.x) * (p2.center.y - tl.center.y)
        - (p1.center.y - tl.center.y) * (p2.center.x - tl.center.x);
    let (tr, bl) = if cross > 0.0 { (p1, p2) } else { (p2, p1) };
    Some([tl, tr, bl])
}

/// Module size implied by the finder spacing, given a reference size.
///
/// `measured` comes from the image along the finder-to-finder lines; without
/// it the finders' own (row-measured) sizes are used.
fn symbol_module_size(
    tl: &FinderPattern,
    tr: &FinderPattern,
    bl: &FinderPattern,
    measured: Option<f32>,
) -> Option<f32> {
    let reference =
        measured.unwrap_or((tl.module_size + tr.module_size + bl.module_size) / 3.0);
    let d_tr = tl.center.distance(&tr.center);
    let d_bl = tl.center.distance(&bl.center);

    let dim1 = estimate_dimension_from_distance(d_tr, reference)?;
    let dim2 = estimate_dimension_from_distance(d_bl, reference)?;
    let dim = if dim1 == dim2 {
        dim1
    } else if dim1.abs_diff(dim2) <= 4 {
        ((dim1 + dim2) / 2).max(21)
    } else {
        return None;
    };

    let module_size = (d_tr + d_bl) / 2.0 / (dim as f32 - 7.0);
    if !(0.7..=1.3).contains(&(module_size / reference)) {
        return None;
    }
    Some(module_size)
}

/// Module size measured through the finders along the top and left edges.
///
/// Row runs of a tilted symbol are up to sqrt 2 times too long; runs along
/// the line joining two finder centers cross the rings square-on.
fn measure_module_size(
    binary: &BitMatrix,
    tl: &FinderPattern,
    tr: &FinderPattern,
    bl: &FinderPattern,
) -> Option<f32> {
    let sizes: Vec<f32> = [(tl, tr), (tr, tl), (tl, bl), (bl, tl)]
        .into_iter()
        .filter_map(|(from, to)| module_size_towards(binary, &from.center, &to.center))
        .collect();
    if sizes.is_empty() {
        return None;
    }
    Some(sizes.iter().sum::<f32>() / sizes.len() as f32)
}

/// Finder width along `from -> to`, measured both ways through `from`
fn module_size_towards(binary: &BitMatrix, from: &Point, to: &Point) -> Option<f32> {
    let limit = from.distance(to);
    let away = Point::new(2.0 * from.x - to.x, 2.0 * from.y - to.y);
    let forward = black_white_black_run(binary, from, to, limit);
    let backward = black_white_black_run(binary, from, &away, limit);
    match (forward, backward) {
        (Some(f), Some(b)) => Some((f + b - 1.0) / 7.0),
        (Some(one), None) | (None, Some(one)) => Some(one / 3.5),
        (None, None) => None,
    }
}

/// Distance from `from` (a finder center) to the light module just past the
/// finder's outer ring, walking towards `to`
fn black_white_black_run(binary: &BitMatrix, from: &Point, to: &Point, limit: f32) -> Option<f32> {
    let length = from.distance(to);
    if length == 0.0 {
        return None;
    }
    let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);

    // 0: center, 1: light ring, 2: dark ring
    let mut state = 0;
    let mut travelled = 0.0;
    for step in 0..=limit as usize {
        travelled = step as f32;
        let x = (from.x + ux * travelled).round();
        let y = (from.y + uy * travelled).round();
        if x < 0.0 || y < 0.0 || x >= binary.width() as f32 || y >= binary.height() as f32 {
            break;
        }
        if (state == 1) == binary.get(x as usize, y as usize) {
            state += 1;
            if state == 3 {
                return Some(travelled);
            }
        }
    }
    (state == 2).then_some(travelled)
}

fn estimate_dimension_from_distance(distance: f32, module_size: f32) -> Option<usize> {
    if module_size <= 0.0 {
        return None;
    }
    let raw_dim = distance / module_size + 7.0;
    if raw_dim < 19.0 {
        return None;
    }
    let version = ((raw_dim - 17.0) / 4.0).round() as i32;
    if !(1..=40).contains(&version) {
        return None;
    }
    Some(17 + 4 * version as usize)
}
