//! Basic geometry primitives for terrain volume calculations.

mod point3;
mod triangle;

pub use point3::Point3;
pub use triangle::Triangle;
