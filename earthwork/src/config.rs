//! Options controlling a volume query and their JSON configuration file.

use std::fmt;
use std::str::FromStr;

use crate::curve::LevelRange;
use crate::error::{Result, VolumeError};
use crate::swell::validate_swell_factor;
use crate::tolerance::Tolerance;

/// What to do with facets that have no usable plane equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Exclude the facet and report it in the skipped list.
    #[default]
    Skip,
    /// Abort the query on the first such facet.
    Fail,
}

impl FromStr for DegeneratePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown degenerate policy `{other}`, expected skip or fail")),
        }
    }
}

impl fmt::Display for DegeneratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegeneratePolicy::Skip => write!(f, "skip"),
            DegeneratePolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Parameters shared by every volume query.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VolumeOptions {
    pub tolerance: Tolerance,
    /// Multiplier applied to reported fill.
    pub swell_factor: f64,
    pub degenerate_policy: DegeneratePolicy,
}

impl VolumeOptions {
    pub fn with_swell_factor(mut self, swell_factor: f64) -> Self {
        self.swell_factor = swell_factor;
        self
    }

    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Rejects invalid swell factors and tolerances before any computation.
    pub fn validate(&self) -> Result<()> {
        self.tolerance.validate()?;
        validate_swell_factor(self.swell_factor)?;
        Ok(())
    }
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            swell_factor: 1.0,
            degenerate_policy: DegeneratePolicy::Skip,
        }
    }
}

/// Level or level sweep requested by a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    Single { level: f64 },
    Curve(LevelRange),
}

/// On-disk description of a volume query.
///
/// Either `level` or all of `level_min`, `level_max` and `step` must be set.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub swell_factor: f64,
    pub degenerate_policy: DegeneratePolicy,
    pub tolerance: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        let options = VolumeOptions::default();
        Self {
            level: None,
            level_min: None,
            level_max: None,
            step: None,
            swell_factor: options.swell_factor,
            degenerate_policy: options.degenerate_policy,
            tolerance: options.tolerance.value(),
        }
    }
}

impl VolumeConfig {
    /// Validated engine options.
    pub fn options(&self) -> Result<VolumeOptions> {
        let options = VolumeOptions {
            tolerance: Tolerance::new(self.tolerance)?,
            swell_factor: self.swell_factor,
            degenerate_policy: self.degenerate_policy,
        };
        options.validate()?;
        Ok(options)
    }

    /// The requested query.
    pub fn query(&self) -> Result<Query> {
        match (self.level, self.level_min, self.level_max, self.step) {
            (Some(level), None, None, None) => Ok(Query::Single { level }),
            (None, Some(min), Some(max), Some(step)) => {
                Ok(Query::Curve(LevelRange::new(min, max, step)?))
            }
            (None, None, None, None) => Err(VolumeError::InvalidConfig(
                "no level or level range given".to_string(),
            )),
            _ => Err(VolumeError::InvalidConfig(
                "set either `level` or all of `level_min`, `level_max` and `step`".to_string(),
            )),
        }
    }

    /// Saves this configuration to a JSON file.
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: &str) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: VolumeConfig = serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }
}
