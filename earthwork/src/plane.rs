//! Plane equations for TIN facets.

use crate::error::{Result, VolumeError};
use crate::geometry::{Point3, Triangle};
use crate::tolerance::Tolerance;

/// Plane through a facet written as `p(x - x0) + q(y - y0) + r(z - z0) = 0`.
///
/// `(p, q, r)` is the facet normal `AB x BC` and `(x0, y0, z0)` is the first
/// vertex. Instances produced by [`solve`] always have `|r| > epsilon`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaneEquation {
    pub normal: [f64; 3],
    pub anchor: Point3,
}

impl PlaneEquation {
    pub fn p(&self) -> f64 {
        self.normal[0]
    }

    pub fn q(&self) -> f64 {
        self.normal[1]
    }

    pub fn r(&self) -> f64 {
        self.normal[2]
    }

    /// Elevation of the plane at `(x, y)`.
    pub fn elevation_at(&self, x: f64, y: f64) -> f64 {
        let [p, q, r] = self.normal;
        self.anchor.z - (p * (x - self.anchor.x) + q * (y - self.anchor.y)) / r
    }

    /// Plan area of the facet the plane was solved from; `r` is twice the
    /// signed projected area.
    pub fn projected_area(&self) -> f64 {
        0.5 * self.r().abs()
    }
}

/// Solves the plane equation of a facet.
///
/// Fails with [`VolumeError::DegenerateFacet`] when the vertices are
/// collinear or coincident (normal length within `tol`) and with
/// [`VolumeError::VerticalFacet`] when the normal has no vertical component.
pub fn solve(triangle: &Triangle, tol: Tolerance) -> Result<PlaneEquation> {
    let Triangle { a, b, c } = *triangle;
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return Err(VolumeError::DegenerateFacet);
    }
    let ab = b - a;
    let bc = c - b;
    let normal = ab.cross(&bc);
    if tol.is_zero(normal.norm()) {
        return Err(VolumeError::DegenerateFacet);
    }
    // r is twice the projected area, so a vertical facet also has no plan
    // footprint to integrate over.
    if tol.is_zero(normal.z) {
        return Err(VolumeError::VerticalFacet);
    }
    Ok(PlaneEquation {
        normal: [normal.x, normal.y, normal.z],
        anchor: a,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(a.into(), b.into(), c.into())
    }

    #[test]
    fn horizontal_plane() {
        let plane = solve(
            &tri([0.0, 0.0, 4.0], [1.0, 0.0, 4.0], [0.0, 1.0, 4.0]),
            Tolerance::DEFAULT,
        )
        .unwrap();
        assert_eq!(plane.p(), 0.0);
        assert_eq!(plane.q(), 0.0);
        assert!(plane.r() > 0.0);
        assert!((plane.elevation_at(12.0, -7.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn inclined_plane_passes_through_vertices() {
        let t = tri([0.0, 0.0, 2.0], [2.0, 0.0, -2.0], [0.0, 2.0, 0.0]);
        let plane = solve(&t, Tolerance::DEFAULT).unwrap();
        for v in t.vertices() {
            assert!((plane.elevation_at(v.x, v.y) - v.z).abs() < 1e-12);
        }
        assert!((plane.projected_area() - t.projected_area()).abs() < 1e-12);
        assert!((plane.elevation_at(0.5, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clockwise_order_gives_same_surface() {
        let plane = solve(
            &tri([0.0, 0.0, 1.0], [0.0, 3.0, 4.0], [3.0, 0.0, 1.0]),
            Tolerance::DEFAULT,
        )
        .unwrap();
        assert!(plane.r() < 0.0);
        assert!((plane.elevation_at(1.0, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_vertices_are_degenerate() {
        let t = tri([1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [2.0, 3.0, 1.0]);
        assert_eq!(solve(&t, Tolerance::DEFAULT), Err(VolumeError::DegenerateFacet));
    }

    #[test]
    fn collinear_vertices_are_degenerate() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert_eq!(solve(&t, Tolerance::DEFAULT), Err(VolumeError::DegenerateFacet));
    }

    #[test]
    fn vertical_facet_is_rejected() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.0, 3.0]);
        assert_eq!(solve(&t, Tolerance::DEFAULT), Err(VolumeError::VerticalFacet));
    }

    #[test]
    fn non_finite_vertex_is_degenerate() {
        let t = tri([0.0, 0.0, f64::NAN], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(solve(&t, Tolerance::DEFAULT), Err(VolumeError::DegenerateFacet));
    }
}
