use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FIT_TOLERANCE, DEFAULT_MAX_ITERATIONS, DEFAULT_PROJECTION_SCALE, DEFAULT_WIDTH_GUESS,
};
use crate::error::{ProfilerError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfilerConfig {
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub fit: FitConfig,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            fit: FitConfig::default(),
        }
    }
}

impl ProfilerConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.projection.bucket_size {
            return Err(ProfilerError::InvalidBucketSize(0));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Divisor applied to raw line sums (display-range normalization).
    pub scale: f64,
    /// Coarsening bucket size. `None` keeps full resolution.
    pub bucket_size: Option<usize>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_PROJECTION_SCALE,
            bucket_size: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FitConfig {
    /// Initial 1/e radius guess (in pixels) for the optimizer.
    pub width_guess: f64,
    /// Iteration cap before the fit falls back to the sentinel result.
    pub max_iterations: usize,
    /// Relative step-size threshold for convergence.
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            width_guess: DEFAULT_WIDTH_GUESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_FIT_TOLERANCE,
        }
    }
}
