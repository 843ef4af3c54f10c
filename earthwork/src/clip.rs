//! Partitioning of facets against a horizontal reference level.
//!
//! A facet whose vertices lie on both sides of the level is cut along the
//! contour at that level. Every piece returned by [`clip_triangle`] lies
//! entirely on one side, and the pieces tile the original plan area exactly.

use log::trace;

use crate::error::{Result, VolumeError};
use crate::geometry::{Point3, Triangle};
use crate::tolerance::Tolerance;

/// Position of a vertex or facet relative to the reference level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Strictly above the level; contributes cut.
    Above,
    /// Strictly below the level; contributes fill.
    Below,
    /// Within tolerance of the level.
    On,
}

impl Side {
    /// Classifies an elevation against `level`.
    pub fn classify(z: f64, level: f64, tol: Tolerance) -> Self {
        let dz = z - level;
        if tol.is_zero(dz) {
            Side::On
        } else if dz > 0.0 {
            Side::Above
        } else {
            Side::Below
        }
    }
}

/// Piece of a facet lying on a single side of the level.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClippedFacet {
    pub triangle: Triangle,
    pub side: Side,
}

impl ClippedFacet {
    fn new(triangle: Triangle, side: Side) -> Self {
        Self { triangle, side }
    }
}

/// Point where the edge `from -> to` crosses `level`. Both endpoints must be
/// on opposite sides of the level.
fn crossing(from: Point3, to: Point3, level: f64, tol: Tolerance) -> Result<Point3> {
    let delta = to.z - from.z;
    if tol.is_zero(delta) || !delta.is_finite() {
        return Err(VolumeError::ToleranceInconsistency { level, delta });
    }
    let t = (level - from.z) / delta;
    let mut p = from.lerp(to, t);
    p.z = level;
    Ok(p)
}

/// Splits `triangle` into pieces that each lie on one side of `level`.
///
/// * No vertex strictly above or none strictly below: the facet is returned
///   unchanged, tagged with the side of its off-level vertices, or
///   [`Side::On`] when all three are on the level.
/// * One vertex on the level with the others on opposite sides: the edge
///   between the straddling vertices is cut, giving one triangle per side.
/// * One vertex alone on its side: the lone corner becomes a triangle and the
///   remaining quadrilateral is split into two triangles.
///
/// Vertices on the level never act as crossing endpoints. Vertex order of the
/// input is preserved in every piece so plan orientation does not flip.
pub fn clip_triangle(triangle: &Triangle, level: f64, tol: Tolerance) -> Result<Vec<ClippedFacet>> {
    let v = triangle.vertices();
    let sides = v.map(|p| Side::classify(p.z, level, tol));
    let above = sides.iter().filter(|s| **s == Side::Above).count();
    let below = sides.iter().filter(|s| **s == Side::Below).count();

    match (above, below) {
        (0, 0) => Ok(vec![ClippedFacet::new(*triangle, Side::On)]),
        (_, 0) => Ok(vec![ClippedFacet::new(*triangle, Side::Above)]),
        (0, _) => Ok(vec![ClippedFacet::new(*triangle, Side::Below)]),
        (1, 1) => {
            let on = sides.iter().position(|s| *s == Side::On).unwrap_or(0);
            let i1 = (on + 1) % 3;
            let i2 = (on + 2) % 3;
            let p = crossing(v[i1], v[i2], level, tol)?;
            trace!("clip: vertex {on} on level {level}, edge {i1}-{i2} cut");
            Ok(vec![
                ClippedFacet::new(Triangle::new(v[on], v[i1], p), sides[i1]),
                ClippedFacet::new(Triangle::new(v[on], p, v[i2]), sides[i2]),
            ])
        }
        _ => {
            let lone_side = if above == 1 { Side::Above } else { Side::Below };
            let lone = sides.iter().position(|s| *s == lone_side).unwrap_or(0);
            let i1 = (lone + 1) % 3;
            let i2 = (lone + 2) % 3;
            let p = crossing(v[lone], v[i1], level, tol)?;
            let q = crossing(v[lone], v[i2], level, tol)?;
            trace!("clip: vertex {lone} alone {lone_side:?} level {level}");
            let other = sides[i1];
            Ok(vec![
                ClippedFacet::new(Triangle::new(v[lone], p, q), lone_side),
                ClippedFacet::new(Triangle::new(p, v[i1], v[i2]), other),
                ClippedFacet::new(Triangle::new(p, v[i2], q), other),
            ])
        }
    }
}
