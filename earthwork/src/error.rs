use thiserror::Error;

/// Result type for volume operations
pub type Result<T> = std::result::Result<T, VolumeError>;

/// Errors raised by the volume engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    #[error("degenerate facet: vertices are collinear or coincident in plan view")]
    DegenerateFacet,

    #[error("vertical facet: elevation is not a function of x and y")]
    VerticalFacet,

    #[error("facet {index}: {source}")]
    Facet {
        index: usize,
        #[source]
        source: Box<VolumeError>,
    },

    #[error("invalid swell factor {0}: must be a finite value greater than zero")]
    InvalidSwellFactor(f64),

    #[error("invalid level range: min {min}, max {max}, step {step}")]
    InvalidLevelRange { min: f64, max: f64, step: f64 },

    #[error("invalid level {0}")]
    InvalidLevel(f64),

    #[error("invalid tolerance {0}: must be a finite value greater than zero")]
    InvalidTolerance(f64),

    #[error(
        "tolerance inconsistency: edge classified as straddling level {level} \
         but elevation difference {delta} is within tolerance"
    )]
    ToleranceInconsistency { level: f64, delta: f64 },

    #[error("triangle {triangle} references missing vertex {vertex}")]
    InvalidIndex { triangle: usize, vertex: usize },

    #[error("mesh contains no facets")]
    EmptyMesh,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VolumeError {
    /// Returns `true` for per-facet geometric failures that a skip policy may
    /// exclude from the totals.
    pub fn is_facet_defect(&self) -> bool {
        matches!(self, VolumeError::DegenerateFacet | VolumeError::VerticalFacet)
    }
}
