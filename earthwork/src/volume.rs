//! Cut and fill totals over a whole mesh.
//!
//! Each facet is solved, clipped and integrated independently, so the mesh is
//! processed as a parallel map over facets followed by a sum reduction.

use log::{debug, warn};
use rayon::prelude::*;

use crate::clip::{clip_triangle, Side};
use crate::config::{DegeneratePolicy, VolumeOptions};
use crate::dtm::Mesh;
use crate::error::{Result, VolumeError};
use crate::geometry::Triangle;
use crate::integrate::{facet_volume, prism_volume};
use crate::plane::{solve, PlaneEquation};
use crate::swell;
use crate::tolerance::Tolerance;

/// Running sum with Neumaier compensation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    /// Combines two partial sums.
    pub fn merge(mut self, other: CompensatedSum) -> Self {
        self.add(other.sum);
        self.add(other.compensation);
        self
    }

    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Why a facet was left out of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    Degenerate,
    Vertical,
}

/// Facet excluded under [`DegeneratePolicy::Skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkippedFacet {
    /// Position of the facet in the mesh.
    pub index: usize,
    pub reason: SkipReason,
}

/// Cut and fill at one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeResult {
    /// Material above the level.
    pub cut: f64,
    /// Material needed below the level, after swell adjustment.
    pub fill: f64,
    /// `cut - fill`.
    pub net: f64,
}

impl VolumeResult {
    pub fn new(cut: f64, fill: f64) -> Self {
        Self {
            cut,
            fill,
            net: cut - fill,
        }
    }
}

/// Result of a single-level query.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeReport {
    pub level: f64,
    pub result: VolumeResult,
    pub skipped: Vec<SkippedFacet>,
}

impl VolumeReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Unswelled cut and fill totals.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    cut: CompensatedSum,
    fill: CompensatedSum,
}

impl Totals {
    fn merge(self, other: Totals) -> Self {
        Self {
            cut: self.cut.merge(other.cut),
            fill: self.fill.merge(other.fill),
        }
    }
}

/// Mesh whose facet planes have been solved once.
///
/// The plane of a facet does not depend on the level, so a prepared mesh can
/// be queried at many levels without solving again.
#[derive(Debug, Clone)]
pub struct PreparedMesh<'a> {
    mesh: &'a Mesh,
    /// Facet index and plane of every facet taking part in the totals.
    planes: Vec<(usize, PlaneEquation)>,
    skipped: Vec<SkippedFacet>,
    tolerance: Tolerance,
}

impl<'a> PreparedMesh<'a> {
    /// Solves every facet plane. Under [`DegeneratePolicy::Fail`] the lowest
    /// indexed failure is returned.
    pub fn new(mesh: &'a Mesh, options: &VolumeOptions) -> Result<Self> {
        options.validate()?;
        let tolerance = options.tolerance;
        let solved: Vec<Result<PlaneEquation>> = mesh
            .triangles()
            .par_iter()
            .map(|t| solve(t, tolerance))
            .collect();

        let mut planes = Vec::with_capacity(solved.len());
        let mut skipped = Vec::new();
        for (index, outcome) in solved.into_iter().enumerate() {
            match outcome {
                Ok(plane) => planes.push((index, plane)),
                Err(err) if err.is_facet_defect() => match options.degenerate_policy {
                    DegeneratePolicy::Fail => {
                        return Err(VolumeError::Facet {
                            index,
                            source: Box::new(err),
                        })
                    }
                    DegeneratePolicy::Skip => {
                        warn!("skipping facet {index}: {err}");
                        let reason = match err {
                            VolumeError::VerticalFacet => SkipReason::Vertical,
                            _ => SkipReason::Degenerate,
                        };
                        skipped.push(SkippedFacet { index, reason });
                    }
                },
                Err(err) => return Err(err),
            }
        }
        Ok(Self {
            mesh,
            planes,
            skipped,
            tolerance,
        })
    }

    /// Facets excluded from every query on this mesh.
    pub fn skipped(&self) -> &[SkippedFacet] {
        &self.skipped
    }

    /// Number of facets that take part in the totals.
    pub fn facet_count(&self) -> usize {
        self.planes.len()
    }

    fn totals(&self, level: f64) -> Result<Totals> {
        if !level.is_finite() {
            return Err(VolumeError::InvalidLevel(level));
        }
        let triangles = self.mesh.triangles();
        self.planes
            .par_iter()
            .map(|(i, plane)| facet_totals(&triangles[*i], plane, level, self.tolerance))
            .try_fold(Totals::default, |acc, t| t.map(|t| acc.merge(t)))
            .try_reduce(Totals::default, |a, b| Ok(a.merge(b)))
    }

    /// Cut and swelled fill at `level`.
    pub fn result_at(&self, level: f64, swell_factor: f64) -> Result<VolumeResult> {
        let totals = self.totals(level)?;
        let fill = swell::adjust(totals.fill.value(), swell_factor)?;
        Ok(VolumeResult::new(totals.cut.value(), fill))
    }

    /// Signed volume between the surface and `datum` without swell.
    pub fn net_volume(&self, datum: f64) -> Result<f64> {
        let totals = self.totals(datum)?;
        Ok(totals.cut.value() - totals.fill.value())
    }
}

fn facet_totals(
    triangle: &Triangle,
    plane: &PlaneEquation,
    level: f64,
    tol: Tolerance,
) -> Result<Totals> {
    let mut totals = Totals::default();
    let pieces = clip_triangle(triangle, level, tol)?;
    // an unsplit facet reuses the plan area held by its plane
    let whole = pieces.len() == 1;
    for piece in pieces {
        let volume = if whole {
            prism_volume(plane.projected_area(), &piece.triangle, level).abs()
        } else {
            facet_volume(&piece.triangle, level)
        };
        match piece.side {
            Side::Above => totals.cut.add(volume),
            Side::Below => totals.fill.add(volume),
            Side::On => {}
        }
    }
    Ok(totals)
}

/// Cut and fill between `mesh` and a horizontal plane at `level`.
///
/// Surface above the level counts as cut, surface below as fill. Fill is
/// multiplied by the swell factor of `options`. Facets without a usable plane
/// are handled according to the degenerate policy.
pub fn cut_fill(mesh: &Mesh, level: f64, options: &VolumeOptions) -> Result<VolumeReport> {
    if !level.is_finite() {
        return Err(VolumeError::InvalidLevel(level));
    }
    let prepared = PreparedMesh::new(mesh, options)?;
    let result = prepared.result_at(level, options.swell_factor)?;
    debug!(
        "level {level}: cut {:.3}, fill {:.3} over {} facets ({} skipped)",
        result.cut,
        result.fill,
        prepared.facet_count(),
        prepared.skipped.len()
    );
    Ok(VolumeReport {
        level,
        result,
        skipped: prepared.skipped,
    })
}

/// Net volume of the surface above `datum`; negative when the surface lies
/// mostly below it. Swell is not applied.
pub fn volume_above_datum(mesh: &Mesh, datum: f64, options: &VolumeOptions) -> Result<f64> {
    PreparedMesh::new(mesh, options)?.net_volume(datum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn flat_square(z: f64) -> Mesh {
        Mesh::new(vec![
            Triangle::new(
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ),
        ])
    }

    #[test]
    fn compensated_sum_recovers_small_terms() {
        let mut total = CompensatedSum::default();
        total.add(1.0);
        for _ in 0..10 {
            total.add(1e-16);
        }
        total.add(-1.0);
        assert!((total.value() - 1e-15).abs() < 1e-25);

        let mut left = CompensatedSum::default();
        left.add(1e100);
        left.add(1.0);
        let mut right = CompensatedSum::default();
        right.add(-1e100);
        assert_eq!(left.merge(right).value(), 1.0);
    }

    #[test]
    fn flat_square_above_and_below() {
        let mesh = flat_square(1.0);
        let report = cut_fill(&mesh, 0.0, &VolumeOptions::default()).unwrap();
        assert!((report.result.cut - 1.0).abs() < 1e-12);
        assert_eq!(report.result.fill, 0.0);
        let report = cut_fill(&mesh, 3.0, &VolumeOptions::default()).unwrap();
        assert_eq!(report.result.cut, 0.0);
        assert!((report.result.fill - 2.0).abs() < 1e-12);
        assert!((report.result.net + 2.0).abs() < 1e-12);
    }

    #[test]
    fn flat_square_at_own_level_is_zero() {
        let report = cut_fill(&flat_square(4.2), 4.2, &VolumeOptions::default()).unwrap();
        assert_eq!(report.result, VolumeResult::new(0.0, 0.0));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn swell_applies_to_fill_only() {
        let options = VolumeOptions::default().with_swell_factor(1.25);
        let report = cut_fill(&flat_square(0.0), 2.0, &options).unwrap();
        assert!((report.result.fill - 2.5).abs() < 1e-12);
        let report = cut_fill(&flat_square(2.0), 0.0, &options).unwrap();
        assert!((report.result.cut - 2.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_policy() {
        let mut triangles = flat_square(1.0).triangles().to_vec();
        triangles.push(Triangle::new(
            Point3::new(5.0, 5.0, 1.0),
            Point3::new(5.0, 5.0, 1.0),
            Point3::new(6.0, 5.0, 1.0),
        ));
        let mesh = Mesh::new(triangles);
        let report = cut_fill(&mesh, 0.0, &VolumeOptions::default()).unwrap();
        assert_eq!(
            report.skipped,
            vec![SkippedFacet {
                index: 2,
                reason: SkipReason::Degenerate
            }]
        );
        assert!((report.result.cut - 1.0).abs() < 1e-12);

        let fail = VolumeOptions::default().with_policy(DegeneratePolicy::Fail);
        let err = cut_fill(&mesh, 0.0, &fail).unwrap_err();
        assert_eq!(
            err,
            VolumeError::Facet {
                index: 2,
                source: Box::new(VolumeError::DegenerateFacet)
            }
        );
    }

    #[test]
    fn prepared_planes_serve_every_level() {
        let mesh = Mesh::new(vec![
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 4.0),
            ),
            Triangle::new(
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(2.0, 2.0, 1.0),
                Point3::new(3.0, 3.0, 1.0),
            ),
        ]);
        let prepared = PreparedMesh::new(&mesh, &VolumeOptions::default()).unwrap();
        assert_eq!(prepared.facet_count(), 1);
        assert_eq!(prepared.skipped().len(), 1);

        // whole facet above, whole facet below, then split
        let above = prepared.result_at(-1.0, 1.0).unwrap();
        assert!((above.cut - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(above.fill, 0.0);
        let below = prepared.result_at(5.0, 1.0).unwrap();
        assert_eq!(below.cut, 0.0);
        assert!((below.fill - 22.0 / 3.0).abs() < 1e-12);
        let split = prepared.result_at(2.0, 1.0).unwrap();
        assert!(split.cut > 0.0 && split.fill > 0.0);
        assert!((split.net + 4.0 / 3.0).abs() < 1e-12);
        assert!((prepared.net_volume(2.0).unwrap() - split.net).abs() < 1e-12);
    }

    #[test]
    fn invalid_inputs_rejected_up_front() {
        let mesh = flat_square(0.0);
        let bad_swell = VolumeOptions::default().with_swell_factor(-1.0);
        assert_eq!(
            cut_fill(&mesh, 0.0, &bad_swell),
            Err(VolumeError::InvalidSwellFactor(-1.0))
        );
        assert!(matches!(
            cut_fill(&mesh, f64::NAN, &VolumeOptions::default()),
            Err(VolumeError::InvalidLevel(_))
        ));
    }

    #[test]
    fn datum_volume_is_signed() {
        let options = VolumeOptions::default().with_swell_factor(2.0);
        let above = volume_above_datum(&flat_square(3.0), 1.0, &options).unwrap();
        assert!((above - 2.0).abs() < 1e-12);
        let below = volume_above_datum(&flat_square(3.0), 4.0, &options).unwrap();
        assert!((below + 1.0).abs() < 1e-12);
    }
}
