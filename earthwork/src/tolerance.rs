//! Numerical tolerance shared by every geometric predicate.

use crate::error::{Result, VolumeError};

/// Absolute tolerance used for the collinearity, vertical facet and on-level
/// tests.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance(1e-9);

    /// Creates a tolerance, rejecting non-positive or non-finite values.
    pub fn new(epsilon: f64) -> Result<Self> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Self(epsilon))
        } else {
            Err(VolumeError::InvalidTolerance(epsilon))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `true` when `|v| <= epsilon`.
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() <= self.0
    }

    /// Checks a value that may have bypassed [`Tolerance::new`], e.g. through
    /// deserialization.
    pub fn validate(self) -> Result<Self> {
        Self::new(self.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
