//! Swell adjustment of fill quantities.

use crate::error::{Result, VolumeError};

/// Checks that a swell factor is finite and strictly positive.
pub fn validate_swell_factor(swell_factor: f64) -> Result<f64> {
    if swell_factor.is_finite() && swell_factor > 0.0 {
        Ok(swell_factor)
    } else {
        Err(VolumeError::InvalidSwellFactor(swell_factor))
    }
}

/// Scales a fill volume by the ratio of loose to in-place material.
///
/// Only fill is adjusted; cut is always reported in place.
pub fn adjust(fill: f64, swell_factor: f64) -> Result<f64> {
    Ok(fill * validate_swell_factor(swell_factor)?)
}
