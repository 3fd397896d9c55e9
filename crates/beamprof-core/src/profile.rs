//! Per-image analysis pipeline: project both axes, fit both profiles.
//!
//! Each call is stateless; nothing survives between frames. The row and
//! column fits are independent and run on both halves of a `rayon::join`.

use ndarray::Array2;
use serde::Serialize;

use crate::config::ProfilerConfig;
use crate::fit::{fit_gaussian, FitResult};
use crate::frame::BeamImage;
use crate::projection::{project_array, Projection, ProjectionAxis};

/// Projection and fit for one image axis.
#[derive(Clone, Debug, Serialize)]
pub struct AxisProfile {
    pub projection: Projection,
    pub fit: FitResult,
}

/// Full beam characterization of a single frame.
#[derive(Clone, Debug, Serialize)]
pub struct BeamProfile {
    /// Profile along the vertical axis (one sample per image row).
    pub row: AxisProfile,
    /// Profile along the horizontal axis (one sample per image column).
    pub column: AxisProfile,
}

impl BeamProfile {
    /// `(amplitude, center, width)` of the row-axis fit.
    pub fn row_params(&self) -> (f64, f64, f64) {
        (self.row.fit.amplitude, self.row.fit.center, self.row.fit.width)
    }

    /// `(amplitude, center, width)` of the column-axis fit.
    pub fn column_params(&self) -> (f64, f64, f64) {
        (
            self.column.fit.amplitude,
            self.column.fit.center,
            self.column.fit.width,
        )
    }
}

/// Analyze one frame: row and column projections, each fitted to a Gaussian.
pub fn analyze(image: &BeamImage, config: &ProfilerConfig) -> BeamProfile {
    analyze_array(&image.data, config)
}

/// Analyze a raw intensity array. See [`analyze`].
pub fn analyze_array(data: &Array2<f32>, config: &ProfilerConfig) -> BeamProfile {
    let (row, column) = rayon::join(
        || analyze_axis(data, ProjectionAxis::Row, config),
        || analyze_axis(data, ProjectionAxis::Column, config),
    );
    BeamProfile { row, column }
}

fn analyze_axis(data: &Array2<f32>, axis: ProjectionAxis, config: &ProfilerConfig) -> AxisProfile {
    let projection = project_array(data, axis, &config.projection);
    let guess = projection.fit_guess(config.fit.width_guess);
    let fit = fit_gaussian(&projection.positions, &projection.values, &guess, &config.fit);
    AxisProfile { projection, fit }
}
