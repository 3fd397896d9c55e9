use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("pixel buffer length {actual} does not match dimensions {width}x{height}")]
    BufferSizeMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("coarsening bucket size must be at least 1, got {0}")]
    InvalidBucketSize(usize),
}

pub type Result<T> = std::result::Result<T, ProfilerError>;
