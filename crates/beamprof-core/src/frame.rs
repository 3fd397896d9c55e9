use ndarray::Array2;

use crate::error::{ProfilerError, Result};

/// A single grayscale sensor frame.
/// Pixel data is row-major, shape = (height, width), non-negative intensities.
#[derive(Clone, Debug)]
pub struct BeamImage {
    pub data: Array2<f32>,
}

impl BeamImage {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Build an image from a flat row-major pixel buffer as delivered by a
    /// camera driver.
    pub fn from_raw(height: usize, width: usize, pixels: Vec<f32>) -> Result<Self> {
        if pixels.len() != height * width {
            return Err(ProfilerError::BufferSizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        let data = Array2::from_shape_vec((height, width), pixels)
            .expect("buffer length checked against dimensions");
        Ok(Self { data })
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}
