//! Volume between a planar facet and a horizontal reference plane.

use crate::geometry::Triangle;

/// Signed volume between the facet and `level`.
///
/// Elevation is affine over a planar facet, so the integral of `z - level`
/// over the plan area equals the plan area times the mean vertex height
/// difference. Positive values lie above the level (cut), negative below
/// (fill). A facet with zero plan area contributes exactly zero.
pub fn signed_facet_volume(triangle: &Triangle, level: f64) -> f64 {
    prism_volume(triangle.projected_area(), triangle, level)
}

/// Signed volume of a facet whose plan area is already known.
pub fn prism_volume(area: f64, triangle: &Triangle, level: f64) -> f64 {
    if area == 0.0 {
        return 0.0;
    }
    let Triangle { a, b, c } = triangle;
    let mean = ((a.z - level) + (b.z - level) + (c.z - level)) / 3.0;
    area * mean
}

/// Unsigned volume between a facet lying on one side of `level` and the
/// level itself.
pub fn facet_volume(triangle: &Triangle, level: f64) -> f64 {
    signed_facet_volume(triangle, level).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    #[test]
    fn uniform_height_is_exact() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(3.0, 0.0, 10.0),
            Point3::new(0.0, 2.0, 10.0),
        );
        assert_eq!(facet_volume(&t, 0.0), t.projected_area() * 10.0);
        assert_eq!(signed_facet_volume(&t, 0.0), 30.0);
    }

    #[test]
    fn below_level_is_negative() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 3.0),
        );
        let v = signed_facet_volume(&t, 5.0);
        assert!((v + 0.5 * 3.0).abs() < 1e-12);
        assert!((facet_volume(&t, 5.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn sliver_contributes_zero() {
        let t = Triangle::new(
            Point3::new(1.0, 1.0, 4.0),
            Point3::new(1.0, 1.0, 4.0),
            Point3::new(2.0, 2.0, 8.0),
        );
        assert_eq!(facet_volume(&t, 0.0), 0.0);
        assert_eq!(prism_volume(0.0, &t, 0.0), 0.0);
    }

    #[test]
    fn known_area_matches_facet_volume() {
        let t = Triangle::new(
            Point3::new(2.0, 1.0, 6.0),
            Point3::new(5.0, 1.0, 4.0),
            Point3::new(2.0, 3.0, 5.0),
        );
        assert_eq!(prism_volume(t.projected_area(), &t, 1.0), signed_facet_volume(&t, 1.0));
        assert!((prism_volume(3.0, &t, 1.0) - 12.0).abs() < 1e-12);
    }
}
