// src/error.rs

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OccupancyError {
    /// Per-table input does not match the calibrated table count.
    #[error("invalid input: expected {expected} table counts, got {got}")]
    InvalidInput { expected: usize, got: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid calibration: {0}")]
    Calibration(String),
}

pub type Result<T> = std::result::Result<T, OccupancyError>;
