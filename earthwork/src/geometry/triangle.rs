//! Triangular facet of a terrain surface.

use super::Point3;

/// Ordered triple of points forming a single TIN facet.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle {
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// Vertices in their stored order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    /// Area of the facet projected onto the XY plane.
    pub fn projected_area(&self) -> f64 {
        self.signed_projected_area().abs()
    }

    /// Signed projected area; positive when the vertices run counter-clockwise
    /// in plan view.
    ///
    /// Computed from edge vectors relative to `a`, so the result does not
    /// depend on how far the facet lies from the coordinate origin.
    pub fn signed_projected_area(&self) -> f64 {
        0.5 * (self.b - self.a).cross(&(self.c - self.a)).z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projected_area_ignores_elevation() {
        let flat = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        let tilted = Triangle::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(2.0, 0.0, -3.0),
            Point3::new(0.0, 2.0, 1.0),
        );
        assert!((flat.projected_area() - 2.0).abs() < 1e-12);
        assert!((tilted.projected_area() - 2.0).abs() < 1e-12);
        assert!(tilted.signed_projected_area() > 0.0);
    }

    #[test]
    fn clockwise_area_is_negative() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!((t.signed_projected_area() + 2.0).abs() < 1e-12);
        assert!((t.projected_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn area_is_translation_invariant() {
        let local = Triangle::new(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.37, 0.0, -2.0),
            Point3::new(0.0, 0.29, 0.5),
        );
        let (dx, dy) = (512345.678, 5123456.789);
        let shift = |p: Point3| Point3::new(p.x + dx, p.y + dy, p.z);
        let grid = Triangle::new(shift(local.a), shift(local.b), shift(local.c));
        let exact = 0.5 * 0.37 * 0.29;
        assert!((local.projected_area() - exact).abs() < 1e-15);
        assert!((grid.projected_area() - exact).abs() < 1e-7 * exact);
    }
}
