/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// `origin + (a - origin) * s + (b - origin) * t`, the affine step used to
    /// predict module positions from three finder centers
    pub fn affine(origin: &Point, a: &Point, b: &Point, s: f32, t: f32) -> Self {
        Self {
            x: origin.x + (a.x - origin.x) * s + (b.x - origin.x) * t,
            y: origin.y + (a.y - origin.y) * s + (b.y - origin.y) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-6);
        assert!((p1.distance_squared(&p2) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_affine_completes_parallelogram() {
        let tl = Point::new(10.0, 10.0);
        let tr = Point::new(50.0, 12.0);
        let bl = Point::new(8.0, 50.0);
        let br = Point::affine(&tl, &tr, &bl, 1.0, 1.0);
        assert!((br.x - 48.0).abs() < 1e-6);
        assert!((br.y - 52.0).abs() < 1e-6);
    }
}
