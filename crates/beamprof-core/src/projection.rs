//! Reduction of a 2-D intensity image to 1-D beam projections.
//!
//! A projection is the per-line intensity sum along one image axis, scaled
//! into display range and background-subtracted so its floor sits at zero.
//! Row and column projections of the same frame are independent and together
//! describe the beam spot's vertical and horizontal profiles.

use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ProjectionConfig;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::fit::FitGuess;
use crate::frame::BeamImage;

/// Which image dimension the projection runs along.
///
/// `Row` sums each row across its columns: one value per row, length = image
/// height, so the profile varies along the vertical axis. `Column` sums each
/// column down its rows: length = image width, profile along the horizontal
/// axis. No axis is reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionAxis {
    Row,
    Column,
}

/// A background-subtracted 1-D intensity profile.
///
/// `positions` and `values` are index-aligned and equal in length. Without
/// coarsening, `positions[i] == i` (pixel index along the projection axis).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Projection {
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Derive optimizer seed parameters from the profile itself.
    ///
    /// Amplitude guess is the peak value; center guess is the *index* of the
    /// peak (matching how `positions` are generated in the uncoarsened
    /// pipeline); the width guess is taken from the caller.
    pub fn fit_guess(&self, width_guess: f64) -> FitGuess {
        let (center, amplitude) = self
            .values
            .iter()
            .enumerate()
            .fold((0usize, 0.0f64), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });
        FitGuess {
            amplitude,
            center: center as f64,
            width: width_guess,
        }
    }
}

/// Project an image onto one axis.
///
/// Pipeline: per-line sum divided by `config.scale`, minimum subtraction,
/// pixel-index position labeling, optional bucket coarsening, and a final
/// non-finite-to-zero sweep. A degenerate image (either dimension zero)
/// yields an empty projection.
pub fn project(image: &BeamImage, axis: ProjectionAxis, config: &ProjectionConfig) -> Projection {
    project_array(&image.data, axis, config)
}

/// Project a raw array onto one axis. See [`project`].
pub fn project_array(
    data: &Array2<f32>,
    axis: ProjectionAxis,
    config: &ProjectionConfig,
) -> Projection {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return Projection::default();
    }

    let mut values = line_sums(data, axis);
    for v in &mut values {
        *v /= config.scale;
    }

    // Background subtraction: constant sensor/ambient offset shows up as the
    // projection floor.
    let floor = values.iter().cloned().fold(f64::INFINITY, f64::min);
    for v in &mut values {
        *v -= floor;
    }

    let mut positions: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();

    if let Some(bucket) = config.bucket_size {
        if bucket > 1 {
            let (p, v) = coarsen(&positions, &values, bucket);
            positions = p;
            values = v;
        }
    }

    sanitize(&mut positions);
    sanitize(&mut values);

    Projection { positions, values }
}

/// Per-line intensity sums, accumulated in f64.
fn line_sums(data: &Array2<f32>, axis: ProjectionAxis) -> Vec<f64> {
    let (h, w) = data.dim();
    let lines = match axis {
        ProjectionAxis::Row => h,
        ProjectionAxis::Column => w,
    };

    let sum_line = |i: usize| -> f64 {
        match axis {
            ProjectionAxis::Row => (0..w).map(|c| data[[i, c]] as f64).sum(),
            ProjectionAxis::Column => (0..h).map(|r| data[[r, i]] as f64).sum(),
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..lines).into_par_iter().map(sum_line).collect()
    } else {
        (0..lines).map(sum_line).collect()
    }
}

/// Bucket-average a profile down to `floor(len / bucket_size)` samples.
///
/// Each bucket of `bucket_size` consecutive values is replaced by its mean;
/// the bucket's position is the entry at the integer midpoint of its index
/// range. A trailing partial bucket is dropped.
pub fn coarsen(positions: &[f64], values: &[f64], bucket_size: usize) -> (Vec<f64>, Vec<f64>) {
    if bucket_size <= 1 {
        return (positions.to_vec(), values.to_vec());
    }

    let buckets = values.len() / bucket_size;
    let mut new_positions = Vec::with_capacity(buckets);
    let mut new_values = Vec::with_capacity(buckets);

    for k in 0..buckets {
        let start = k * bucket_size;
        let chunk = &values[start..start + bucket_size];
        let mean = chunk.iter().sum::<f64>() / bucket_size as f64;
        new_values.push(mean);
        new_positions.push(positions[start + bucket_size / 2]);
    }

    (new_positions, new_values)
}

/// Replace any NaN or infinity with zero.
fn sanitize(values: &mut [f64]) {
    for v in values {
        if !v.is_finite() {
            *v = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn sanitize_maps_non_finite_to_zero() {
        let mut values = vec![1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -2.0];
        sanitize(&mut values);
        assert_eq!(values, vec![1.0, 0.0, 0.0, 0.0, -2.0]);
    }
}
