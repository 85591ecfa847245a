use thiserror::Error;

/// Errors raised while constructing math primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid bounds: min={min:?}, max={max:?}")]
    InvalidBounds { min: [f32; 3], max: [f32; 3] },

    #[error("Cannot merge an empty collection of bounding boxes")]
    EmptyMerge,
}

pub type MathResult<T> = Result<T, MathError>;
