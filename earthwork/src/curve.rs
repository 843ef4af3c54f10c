//! Cut/fill volume as a function of reference level.

use log::debug;
use rayon::prelude::*;

use crate::config::VolumeOptions;
use crate::dtm::Mesh;
use crate::error::{Result, VolumeError};
use crate::volume::{PreparedMesh, SkippedFacet, VolumeResult};

/// Upper bound on the number of levels in one sweep.
pub const MAX_CURVE_LEVELS: usize = 1_000_000;

/// Closed sweep of levels `min, min + step, ...` not exceeding `max`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LevelRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl LevelRange {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        let range = Self { min, max, step };
        range.validate()?;
        Ok(range)
    }

    /// Requires finite bounds, `min <= max` and `step > 0`.
    pub fn validate(&self) -> Result<()> {
        let finite = self.min.is_finite() && self.max.is_finite() && self.step.is_finite();
        if !finite || self.min > self.max || self.step <= 0.0 {
            return Err(self.invalid());
        }
        if self.count() > MAX_CURVE_LEVELS {
            return Err(self.invalid());
        }
        Ok(())
    }

    fn invalid(&self) -> VolumeError {
        VolumeError::InvalidLevelRange {
            min: self.min,
            max: self.max,
            step: self.step,
        }
    }

    /// Number of levels in the sweep. `max` is included when it falls on the
    /// step grid up to rounding.
    pub fn count(&self) -> usize {
        let span = (self.max - self.min) / self.step;
        let slack = span.abs().max(1.0) * 1e-9;
        ((span + slack).floor() as usize).saturating_add(1)
    }

    /// Levels of the sweep in increasing order.
    pub fn levels(&self) -> Vec<f64> {
        (0..self.count())
            .map(|i| (self.min + i as f64 * self.step).min(self.max))
            .collect()
    }
}

/// One sample of a volume curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    pub level: f64,
    #[serde(flatten)]
    pub result: VolumeResult,
}

/// Cut/fill samples ordered by increasing level.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeCurve {
    pub points: Vec<CurvePoint>,
    /// Facets excluded from every sample.
    pub skipped: Vec<SkippedFacet>,
}

impl VolumeCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Level at which cut balances swelled fill, interpolated linearly between
    /// the bracketing samples. `None` when the net volume never changes sign.
    pub fn balance_level(&self) -> Option<f64> {
        balance_level(self)
    }
}

/// Computes cut and fill at every level of `range`.
///
/// Facet planes are solved once; the levels are then evaluated in parallel.
pub fn volume_curve(mesh: &Mesh, range: &LevelRange, options: &VolumeOptions) -> Result<VolumeCurve> {
    range.validate()?;
    let prepared = PreparedMesh::new(mesh, options)?;
    let levels = range.levels();
    debug!(
        "volume curve: {} levels from {} to {} over {} facets",
        levels.len(),
        range.min,
        range.max,
        prepared.facet_count()
    );
    let points = levels
        .par_iter()
        .map(|&level| {
            prepared
                .result_at(level, options.swell_factor)
                .map(|result| CurvePoint { level, result })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(VolumeCurve {
        points,
        skipped: prepared.skipped().to_vec(),
    })
}

/// Sweeps from the lowest to the highest point of the mesh.
pub fn volume_curve_auto(mesh: &Mesh, step: f64, options: &VolumeOptions) -> Result<VolumeCurve> {
    let (min, max) = mesh.elevation_range().ok_or(VolumeError::EmptyMesh)?;
    let range = LevelRange::new(min, max, step)?;
    volume_curve(mesh, &range, options)
}

/// Level where net volume crosses zero. An exact zero sample is returned as
/// is; otherwise the first sign change is interpolated.
pub fn balance_level(curve: &VolumeCurve) -> Option<f64> {
    if let Some(p) = curve.points.iter().find(|p| p.result.net == 0.0) {
        return Some(p.level);
    }
    curve.points.windows(2).find_map(|w| {
        let (a, b) = (w[0], w[1]);
        if a.result.net.signum() != b.result.net.signum() {
            let t = a.result.net / (a.result.net - b.result.net);
            Some(a.level + t * (b.level - a.level))
        } else {
            None
        }
    })
}
