use crate::error::{Result, VolumeError};
use crate::geometry::{Point3, Triangle};

/// Triangulated Irregular Network with shared vertices.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tin {
    /// Vertices of the TIN.
    pub vertices: Vec<Point3>,
    /// Indices into `vertices` forming triangles.
    pub triangles: Vec<[usize; 3]>,
}

impl Tin {
    /// Builds a TIN from the provided vertices using Delaunay triangulation on
    /// the XY plane. Fewer than three non-collinear points give an empty TIN.
    pub fn from_points(points: Vec<Point3>) -> Self {
        let coords: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        let triangles = triangulation
            .triangles
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self {
            vertices: points,
            triangles,
        }
    }

    /// Resolves the vertex indices into a facet list.
    pub fn to_mesh(&self) -> Result<Mesh> {
        let mut facets = Vec::with_capacity(self.triangles.len());
        for (i, tri) in self.triangles.iter().enumerate() {
            let mut pts = [Point3::new(0.0, 0.0, 0.0); 3];
            for (slot, &idx) in pts.iter_mut().zip(tri.iter()) {
                *slot = *self.vertices.get(idx).ok_or(VolumeError::InvalidIndex {
                    triangle: i,
                    vertex: idx,
                })?;
            }
            facets.push(Triangle::new(pts[0], pts[1], pts[2]));
        }
        Ok(Mesh::new(facets))
    }
}

/// Ordered collection of facets forming a terrain surface.
///
/// Facets are independent; no adjacency is kept. The volume engine only reads
/// a mesh and never modifies it.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Lowest and highest facet elevation, or `None` for an empty mesh.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices())
            .fold(None, |acc, p| match acc {
                None => Some((p.z, p.z)),
                Some((lo, hi)) => Some((lo.min(p.z), hi.max(p.z))),
            })
    }

    /// Total plan area of all facets.
    pub fn projected_area(&self) -> f64 {
        self.triangles.iter().map(Triangle::projected_area).sum()
    }
}
