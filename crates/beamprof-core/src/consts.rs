/// Divisor applied to raw projection sums. Purely a display-range
/// normalization inherited from the sensor calibration; not statistically
/// meaningful.
pub const DEFAULT_PROJECTION_SCALE: f64 = 40.0;

/// Default 1/e intensity radius guess (in pixels) seeding the Gaussian fit.
pub const DEFAULT_WIDTH_GUESS: f64 = 200.0;

/// Default bucket size when projection coarsening is requested.
pub const DEFAULT_COARSEN_BUCKET: usize = 3;

/// Minimum pixel count (h*w) to use line-level Rayon parallelism when
/// reducing an image to a projection.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Maximum Levenberg-Marquardt iterations before the fit is declared
/// non-convergent.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Relative step-size threshold below which the fit is considered converged.
pub const DEFAULT_FIT_TOLERANCE: f64 = 1e-10;
