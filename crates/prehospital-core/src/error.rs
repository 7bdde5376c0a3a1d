use thiserror::Error;

use crate::models::injury::Axis;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid {field}: {value}")]
    InvalidEnum { field: &'static str, value: String },

    #[error("injury {number}: {axis} coordinate {value} is outside [0, 100]")]
    CoordinateOutOfRange { number: u32, axis: Axis, value: f64 },

    #[error("injury number must be positive (got {0})")]
    InvalidInjuryNumber(u32),

    #[error("duplicate injury number {0}")]
    DuplicateInjuryNumber(u32),

    #[error("too many injuries: {count} exceeds the maximum of {max}")]
    TooManyInjuries { count: usize, max: usize },

    #[error("injury {number} notes exceed {max} characters")]
    InjuryNotesTooLong { number: u32, max: usize },
}
