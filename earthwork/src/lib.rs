//! Cut/fill earthwork volumes from triangulated terrain surveys.
//!
//! A surface is a [`dtm::Mesh`] of planar facets. For a reference level each
//! facet is split along the level contour ([`clip`]), the pieces are
//! integrated against the level ([`integrate`]) and summed into cut and fill
//! ([`volume`]). [`curve`] repeats the query over a sweep of levels.

pub mod clip;
pub mod config;
pub mod curve;
pub mod dtm;
pub mod error;
pub mod geometry;
pub mod integrate;
pub mod io;
pub mod plane;
pub mod swell;
pub mod tolerance;
pub mod volume;

pub use config::{DegeneratePolicy, Query, VolumeConfig, VolumeOptions};
pub use curve::{volume_curve, volume_curve_auto, CurvePoint, LevelRange, VolumeCurve};
pub use dtm::{Mesh, Tin};
pub use error::{Result, VolumeError};
pub use tolerance::Tolerance;
pub use volume::{cut_fill, volume_above_datum, VolumeReport, VolumeResult};
