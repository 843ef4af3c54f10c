//! Basic 3D point type used throughout the crate.

use nalgebra::Vector3;

/// Representation of a 3D survey point in a planar Cartesian frame.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Position vector of the point.
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Returns `true` when all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Point on the segment `self -> other` at parameter `t`.
    pub fn lerp(self, other: Point3, t: f64) -> Point3 {
        Point3::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
            self.z + t * (other.z - self.z),
        )
    }
}

impl std::ops::Sub for Point3 {
    type Output = Vector3<f64>;

    fn sub(self, rhs: Point3) -> Vector3<f64> {
        self.to_vector() - rhs.to_vector()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(c: [f64; 3]) -> Self {
        Point3::new(c[0], c[1], c[2])
    }
}
